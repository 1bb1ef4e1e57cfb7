use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use super::history::load_history;
use crate::game::GameRecord;

/// Store a full game record, replacing any earlier copy
pub async fn save_game(pool: &SqlitePool, record: &GameRecord) -> Result<()> {
    let data = serde_json::to_string(record)?;
    let fetched_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO games (id, seed, data, fetched_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(record.id as i64)
    .bind(record.seed.as_deref())
    .bind(data)
    .bind(fetched_at)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to save game {}", record.id))?;

    Ok(())
}

/// Get a stored game by ID
pub async fn load_game_record(pool: &SqlitePool, game_id: u64) -> Result<Option<GameRecord>> {
    let data: Option<String> = sqlx::query_scalar("SELECT data FROM games WHERE id = ?")
        .bind(game_id as i64)
        .fetch_optional(pool)
        .await?;

    data.map(|json| {
        serde_json::from_str(&json).with_context(|| format!("Stored game {} is corrupt", game_id))
    })
    .transpose()
}

pub async fn has_game(pool: &SqlitePool, game_id: u64) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games WHERE id = ?")
        .bind(game_id as i64)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// Full records for every game in a user's stored history, newest first,
/// plus the ids whose record has not been fetched yet
pub async fn load_user_records(
    pool: &SqlitePool,
    username: &str,
) -> Result<(Vec<GameRecord>, Vec<u64>)> {
    let history = load_history(pool, username).await?;

    let mut records = Vec::new();
    let mut missing = Vec::new();

    for meta in history {
        match load_game_record(pool, meta.id).await? {
            Some(record) => records.push(record),
            None => missing.push(meta.id),
        }
    }

    if !missing.is_empty() {
        tracing::debug!("{} has {} games without records", username, missing.len());
    }
    Ok((records, missing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{history::save_history, test_pool};
    use crate::game::{Action, Card, GameOptions};
    use crate::history::GameMeta;

    fn record(id: u64) -> GameRecord {
        GameRecord {
            id,
            players: vec!["alice".into(), "bob".into()],
            deck: (0..50).map(|i| Card::new(i % 5, 1, i)).collect(),
            actions: vec![Action::rank_clue(1, 1), Action::discard(5)],
            options: GameOptions::default(),
            seed: Some("p2v0s1".to_string()),
        }
    }

    fn meta(id: u64) -> GameMeta {
        serde_json::from_value(serde_json::json!({"id": id, "score": 20})).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load_game() {
        let pool = test_pool().await;
        let game = record(77);

        save_game(&pool, &game).await.unwrap();

        assert!(has_game(&pool, 77).await.unwrap());
        assert_eq!(load_game_record(&pool, 77).await.unwrap(), Some(game));
    }

    #[tokio::test]
    async fn test_missing_game_is_none() {
        let pool = test_pool().await;

        assert_eq!(load_game_record(&pool, 5).await.unwrap(), None);
        assert!(!has_game(&pool, 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_game_replaces() {
        let pool = test_pool().await;
        let mut game = record(8);
        save_game(&pool, &game).await.unwrap();

        game.players.push("cathy".into());
        save_game(&pool, &game).await.unwrap();

        let loaded = load_game_record(&pool, 8).await.unwrap().unwrap();
        assert_eq!(loaded.players.len(), 3);
    }

    #[tokio::test]
    async fn test_load_user_records_reports_missing() {
        let pool = test_pool().await;
        save_history(&pool, "alice", &[meta(1), meta(2), meta(3)])
            .await
            .unwrap();
        save_game(&pool, &record(1)).await.unwrap();
        save_game(&pool, &record(3)).await.unwrap();

        let (records, missing) = load_user_records(&pool, "alice").await.unwrap();

        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(missing, vec![2]);
    }
}
