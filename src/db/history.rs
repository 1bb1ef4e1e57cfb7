use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::history::GameMeta;

/// Store history rows for a user. Existing rows are replaced.
pub async fn save_history(pool: &SqlitePool, username: &str, games: &[GameMeta]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for game in games {
        let data = serde_json::to_string(game)?;
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO history (username, game_id, data)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(game.id as i64)
        .bind(data)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to save history for {}", username))?;
    }

    tx.commit().await?;
    Ok(games.len())
}

/// Load a user's history, most recent game first
pub async fn load_history(pool: &SqlitePool, username: &str) -> Result<Vec<GameMeta>> {
    let rows: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT data FROM history
        WHERE username = ?
        ORDER BY game_id DESC
        "#,
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|json| serde_json::from_str(json).context("Stored history row is corrupt"))
        .collect()
}

/// Highest stored game id for a user, used to fetch only newer games
pub async fn latest_game_id(pool: &SqlitePool, username: &str) -> Result<Option<u64>> {
    let id: Option<i64> = sqlx::query_scalar("SELECT MAX(game_id) FROM history WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;

    Ok(id.map(|id| id as u64))
}

pub async fn save_seed_games(pool: &SqlitePool, seed: &str, games: &[GameMeta]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for game in games {
        let data = serde_json::to_string(game)?;
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO seed_games (seed, game_id, data)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(seed)
        .bind(game.id as i64)
        .bind(data)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to save games for seed {}", seed))?;
    }

    tx.commit().await?;
    Ok(games.len())
}

pub async fn load_seed_games(pool: &SqlitePool, seed: &str) -> Result<Vec<GameMeta>> {
    let rows: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT data FROM seed_games
        WHERE seed = ?
        ORDER BY game_id ASC
        "#,
    )
    .bind(seed)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|json| serde_json::from_str(json).context("Stored seed row is corrupt"))
        .collect()
}
