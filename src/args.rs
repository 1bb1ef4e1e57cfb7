use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Replay and summarize hanab.live games", long_about = None)]
pub struct Args {
    /// Directory holding the database, logs and variant list
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Local copy of hanabi-live's variants.json
    #[arg(long, global = true)]
    pub variants: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download full game records by id
    FetchGame {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Download a user's history, newer than what is already stored
    FetchUser {
        username: String,

        /// Also download the full record of every listed game
        #[arg(long)]
        games: bool,
    },

    /// Download every game played on a seed
    FetchSeed { seed: String },

    /// Print the board of a stored game after some number of actions
    Replay {
        id: u64,

        /// Actions to apply; defaults to the whole log
        #[arg(long)]
        turn: Option<usize>,
    },

    /// One summary line per stored game of a user
    Summary {
        username: String,

        #[arg(long)]
        json: bool,
    },

    /// Attempts and time spent before the first win in each variant
    ScoreHunt {
        username: String,

        #[arg(long, default_value_t = 2)]
        players: u32,

        /// Only count games played together with this user
        #[arg(long)]
        partner: Option<String>,
    },

    /// Success rate on the seeds PREFIX1..PREFIXn
    Winrate {
        seed_prefix: String,

        count: u32,

        #[arg(long)]
        players: Option<u32>,

        /// Score counted as a success
        #[arg(long, default_value_t = 25)]
        score: u32,
    },
}
