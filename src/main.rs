use anyhow::{Context, Result, bail};
use clap::Parser;
use sqlx::SqlitePool;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use hanab_stats::{
    analysis::{ScoreHuntRow, score_hunt, score_hunt_filter, success_rate},
    args::{Args, Command},
    config::Config,
    db,
    fetch::Fetcher,
    game::ReplayEngine,
    logging,
    restriction::{max_score, standard},
    summary::{LineSummary, summarize_all},
    variants::VariantCatalog,
};

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = args.data_dir {
        config.variants_path = dir.join("variants.json");
        config.data_dir = dir;
    }
    if let Some(path) = args.variants {
        config.variants_path = path;
    }
    config.ensure_dirs()?;

    let _guard = logging::init(&config.log_dir(), &args.log_level)?;
    info!("starting with data dir {}", config.data_dir.display());

    let rt = Runtime::new().context("failed to start async runtime")?;
    let pool = rt.block_on(db::create_pool(&config.db_path()))?;

    let app = App { config, rt, pool };

    match args.command {
        Command::FetchGame { ids } => fetch_games(&app, &ids),
        Command::FetchUser { username, games } => fetch_user(&app, &username, games),
        Command::FetchSeed { seed } => fetch_seed(&app, &seed).map(|_| ()),
        Command::Replay { id, turn } => replay_game(&app, id, turn),
        Command::Summary { username, json } => summarize_user(&app, &username, json),
        Command::ScoreHunt {
            username,
            players,
            partner,
        } => print_score_hunt(&app, &username, players, partner.as_deref()),
        Command::Winrate {
            seed_prefix,
            count,
            players,
            score,
        } => print_winrate(&app, &seed_prefix, count, players, score),
    }
}

// The pool is declared before the runtime so it is dropped first.
struct App {
    config: Config,
    pool: SqlitePool,
    rt: Runtime,
}

fn fetch_games(app: &App, ids: &[u64]) -> Result<()> {
    let fetcher = Fetcher::new(&app.config)?;

    for &id in ids {
        let record = fetcher.fetch_game(id)?;
        app.rt.block_on(db::games::save_game(&app.pool, &record))?;
        println!("stored game {} ({} actions)", id, record.actions.len());
    }
    Ok(())
}

fn fetch_user(app: &App, username: &str, with_games: bool) -> Result<()> {
    let fetcher = Fetcher::new(&app.config)?;

    let latest = app
        .rt
        .block_on(db::history::latest_game_id(&app.pool, username))?;
    let start = latest.map_or(0, |id| id + 1);

    let history = fetcher.fetch_user_history(username, start)?;
    let saved = app
        .rt
        .block_on(db::history::save_history(&app.pool, username, &history))?;
    println!("stored {} new games for {}", saved, username);

    if !with_games {
        return Ok(());
    }

    let all = app
        .rt
        .block_on(db::history::load_history(&app.pool, username))?;
    let mut fetched = 0;
    for meta in all {
        if app.rt.block_on(db::games::has_game(&app.pool, meta.id))? {
            continue;
        }
        match fetcher.fetch_game(meta.id) {
            Ok(record) => {
                app.rt.block_on(db::games::save_game(&app.pool, &record))?;
                fetched += 1;
            }
            Err(e) => warn!("skipping game {}: {:#}", meta.id, e),
        }
    }
    println!("stored {} game records", fetched);
    Ok(())
}

fn fetch_seed(app: &App, seed: &str) -> Result<usize> {
    let fetcher = Fetcher::new(&app.config)?;
    let games = fetcher.fetch_seed(seed)?;

    app.rt
        .block_on(db::history::save_seed_games(&app.pool, seed, &games))
}

fn replay_game(app: &App, id: u64, turn: Option<usize>) -> Result<()> {
    let Some(record) = app
        .rt
        .block_on(db::games::load_game_record(&app.pool, id))?
    else {
        bail!("game {} is not stored; run `fetch-game {}` first", id, id);
    };

    let target = turn.unwrap_or(record.actions.len());
    let state = ReplayEngine::new(&record).replay(target)?;

    println!(
        "game {} | {} | {}",
        record.id,
        record.variant_name(),
        record.players.join(", ")
    );
    println!("{}", state);
    Ok(())
}

fn summarize_user(app: &App, username: &str, json: bool) -> Result<()> {
    let (records, missing) = app
        .rt
        .block_on(db::games::load_user_records(&app.pool, username))?;
    if !missing.is_empty() {
        eprintln!(
            "{} games have no stored record; run `fetch-user {} --games`",
            missing.len(),
            username
        );
    }

    let (summaries, failures) = summarize_all(&records);

    if json {
        for summary in &summaries {
            println!("{}", serde_json::to_string(summary)?);
        }
    } else {
        println!("{}", LineSummary::HEADER.join("\t"));
        for summary in &summaries {
            println!("{}", summary.to_row().join("\t"));
        }
    }

    for failure in &failures {
        eprintln!("skipped: {}", failure);
    }
    Ok(())
}

fn print_score_hunt(
    app: &App,
    username: &str,
    players: u32,
    partner: Option<&str>,
) -> Result<()> {
    let catalog = VariantCatalog::load_or_empty(&app.config.variants_path)?;
    let history = app
        .rt
        .block_on(db::history::load_history(&app.pool, username))?;
    if history.is_empty() {
        bail!("no history stored for {}; run `fetch-user {}` first", username, username);
    }

    let rows = score_hunt(&history, &score_hunt_filter(players, partner), &catalog);

    println!("{}", ScoreHuntRow::HEADER.join("\t"));
    for row in rows {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            row.variant_name, row.best_score, row.won, row.duration, row.attempts
        );
    }
    Ok(())
}

fn print_winrate(
    app: &App,
    seed_prefix: &str,
    count: u32,
    players: Option<u32>,
    score: u32,
) -> Result<()> {
    let filter = standard(players);
    let goal = max_score(score);

    println!("seed\twinrate");
    for i in 1..=count {
        let seed = format!("{}{}", seed_prefix, i);

        let mut games = app
            .rt
            .block_on(db::history::load_seed_games(&app.pool, &seed))?;
        if games.is_empty() {
            info!("no stored games for seed {}, fetching", seed);
            fetch_seed(app, &seed)?;
            games = app
                .rt
                .block_on(db::history::load_seed_games(&app.pool, &seed))?;
        }

        match success_rate(&games, &filter, &goal) {
            Some(rate) => println!("{}\t{:.4}", seed, rate),
            None => println!("{}\tN/A", seed),
        }
    }
    Ok(())
}
