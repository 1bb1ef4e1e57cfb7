use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Url, blocking::Client};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::{config::Config, game::GameRecord, history::GameMeta};

/// Blocking client for the hanab.live export and history endpoints.
/// Each request is tried once.
pub struct Fetcher {
    client: Client,
    site: String,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            site: config.site.clone(),
        })
    }

    pub fn game_url(&self, game_id: u64) -> Result<Url> {
        self.endpoint(&["export", &game_id.to_string()])
    }

    pub fn user_history_url(&self, username: &str, start_id: u64) -> Result<Url> {
        let mut url = self.endpoint(&["api", "v1", "history-full", username])?;
        if start_id > 0 {
            url.query_pairs_mut()
                .append_pair("start", &start_id.to_string());
        }
        Ok(url)
    }

    pub fn seed_url(&self, seed: &str) -> Result<Url> {
        self.endpoint(&["api", "v1", "seed-full", seed])
    }

    /// Full record (deck and actions) of one game.
    pub fn fetch_game(&self, game_id: u64) -> Result<GameRecord> {
        let url = self.game_url(game_id)?;
        self.get_json(url)
            .with_context(|| format!("failed to fetch game {}", game_id))
    }

    /// History rows for a user, newest first, from game `start_id` onward.
    pub fn fetch_user_history(&self, username: &str, start_id: u64) -> Result<Vec<GameMeta>> {
        let url = self.user_history_url(username, start_id)?;
        self.get_json(url)
            .with_context(|| format!("failed to fetch history for {}", username))
    }

    pub fn fetch_seed(&self, seed: &str) -> Result<Vec<GameMeta>> {
        let url = self.seed_url(seed)?;
        self.get_json(url)
            .with_context(|| format!("failed to fetch seed {}", seed))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url =
            Url::parse(&self.site).with_context(|| format!("invalid site URL {}", self.site))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("site URL cannot take a path: {}", self.site))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        info!("fetching {}", url);
        let text = self.client.get(url).send()?.error_for_status()?.text()?;

        // Missing games come back as a plain-text error with a 200 status.
        if text.starts_with("Error") {
            bail!("server replied: {}", text.trim());
        }

        serde_json::from_str(&text).context("server returned malformed JSON")
    }
}
