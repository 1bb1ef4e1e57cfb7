use anyhow::{Context, Result};
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_SITE: &str = "https://hanab.live";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const APP_DIR: &str = "hanab-stats";

/// Runtime settings. Defaults are overridden by `HANAB_STATS_*` environment
/// variables, then by command-line flags in `main`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub site: String,
    pub timeout: Duration,
    pub variants_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_dir = dirs::data_dir()
            .context("Unable to determine data directory for your platform")?
            .join(APP_DIR);

        Self::from_lookup(default_dir, |key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, which stands in for the environment.
    pub fn from_lookup<F>(default_dir: PathBuf, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("HANAB_STATS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(default_dir);

        let site = lookup("HANAB_STATS_SITE")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SITE.to_string());

        let timeout = match lookup("HANAB_STATS_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("HANAB_STATS_TIMEOUT is not a number of seconds: {}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let variants_path = lookup("HANAB_STATS_VARIANTS")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("variants.json"));

        Ok(Self {
            data_dir,
            site,
            timeout: Duration::from_secs(timeout),
            variants_path,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("games.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Creates the data and log directories if they don't exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(self.log_dir())
            .with_context(|| format!("Failed to create {}", self.log_dir().display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(PathBuf::from("/tmp/hs"), lookup(&[])).unwrap();

        assert_eq!(config.site, DEFAULT_SITE);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.variants_path, PathBuf::from("/tmp/hs/variants.json"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/hs/games.db"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(
            PathBuf::from("/tmp/hs"),
            lookup(&[
                ("HANAB_STATS_DATA_DIR", "/srv/hanab"),
                ("HANAB_STATS_SITE", "http://localhost:8080/"),
                ("HANAB_STATS_TIMEOUT", "30"),
            ]),
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/hanab"));
        assert_eq!(config.site, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.log_dir(), PathBuf::from("/srv/hanab/logs"));
    }

    #[test]
    fn test_bad_timeout() {
        let result = Config::from_lookup(
            PathBuf::from("/tmp/hs"),
            lookup(&[("HANAB_STATS_TIMEOUT", "soon")]),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_lookup(dir.path().join("data"), lookup(&[])).unwrap();

        config.ensure_dirs().unwrap();
        assert!(config.log_dir().is_dir());
    }
}
