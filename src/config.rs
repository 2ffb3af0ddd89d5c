//! Configuration management for the filter compressor (C8, ambient)
//!
//! Handles configuration loading, overlaying an optional TOML file with
//! environment variables and CLI overrides, in the teacher's `config`
//! module style of serde-derived structs with `#[serde(default = ...)]`
//! helpers.

use serde::{Deserialize, Serialize};

use crate::types::{CompressorError, Result};

fn default_poll_idle_delay_secs() -> u64 {
    60
}

fn default_retry_delay_secs() -> u64 {
    10
}

fn default_startup_retry_delay_secs() -> u64 {
    3
}

/// Worker configuration.
///
/// `database_url` is the only mandatory field (§6); everything else has a
/// default matching the upstream source's fixed constants (§7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressorConfig {
    /// Postgres connection string.
    pub database_url: String,

    /// Delay before retrying when the store is mid-batch or under-filled
    /// (§4.6 steps 2 and 3).
    #[serde(default = "default_poll_idle_delay_secs")]
    pub poll_idle_delay_secs: u64,

    /// Backoff after a transient I/O or data-integrity error (§7).
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Backoff between pool-acquisition attempts at startup (§7).
    #[serde(default = "default_startup_retry_delay_secs")]
    pub startup_retry_delay_secs: u64,

    /// Log filter passed to `EnvFilter`; `RUST_LOG` still takes precedence
    /// (matches the teacher's `init_logging` precedence rule).
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl CompressorConfig {
    /// Load from an optional TOML file, then apply environment and CLI
    /// overrides. `database_url_override` models the CLI `--database-url`
    /// flag (§4.10); when given it takes precedence over both the file and
    /// `DATABASE_URL` (§8, property 7).
    pub fn load(
        file_path: Option<&std::path::Path>,
        database_url_override: Option<String>,
    ) -> Result<Self> {
        let mut config = match file_path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    CompressorError::Config(format!("failed to read {}: {e}", path.display()))
                })?;
                toml::from_str(&contents)
                    .map_err(|e| CompressorError::Config(format!("invalid config file: {e}")))?
            }
            None => CompressorConfig {
                database_url: String::new(),
                poll_idle_delay_secs: default_poll_idle_delay_secs(),
                retry_delay_secs: default_retry_delay_secs(),
                startup_retry_delay_secs: default_startup_retry_delay_secs(),
                log_filter: None,
            },
        };

        if let Some(url) = database_url_override {
            config.database_url = url;
        } else if config.database_url.is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                config.database_url = url;
            }
        }

        if config.database_url.is_empty() {
            return Err(CompressorError::Config(
                "database_url must be set via --database-url, config file, or DATABASE_URL"
                    .to_string(),
            ));
        }

        Ok(config)
    }

    pub fn poll_idle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_idle_delay_secs)
    }

    pub fn retry_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.retry_delay_secs)
    }

    pub fn startup_retry_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.startup_retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_override_beats_database_url_env() {
        std::env::set_var("DATABASE_URL_TEST_UNUSED", "unused");
        let config =
            CompressorConfig::load(None, Some("postgres://cli-wins".to_string())).unwrap();
        assert_eq!(config.database_url, "postgres://cli-wins");
    }

    #[test]
    fn missing_database_url_is_an_error() {
        // SAFETY-equivalent: ensure the env var isn't leaking from another test.
        let prior = std::env::var("DATABASE_URL").ok();
        std::env::remove_var("DATABASE_URL");
        let result = CompressorConfig::load(None, None);
        assert!(result.is_err());
        if let Some(value) = prior {
            std::env::set_var("DATABASE_URL", value);
        }
    }

    #[test]
    fn defaults_match_upstream_constants() {
        let config =
            CompressorConfig::load(None, Some("postgres://x".to_string())).unwrap();
        assert_eq!(config.poll_idle_delay_secs, 60);
        assert_eq!(config.retry_delay_secs, 10);
        assert_eq!(config.startup_retry_delay_secs, 3);
    }

    #[test]
    fn file_value_is_used_when_no_override_is_given() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"database_url = \"postgres://from-file\"\npoll_idle_delay_secs = 5\n",
        )
        .unwrap();

        let prior = std::env::var("DATABASE_URL").ok();
        std::env::remove_var("DATABASE_URL");
        let config = CompressorConfig::load(Some(file.path()), None).unwrap();
        if let Some(value) = prior {
            std::env::set_var("DATABASE_URL", value);
        }

        assert_eq!(config.database_url, "postgres://from-file");
        assert_eq!(config.poll_idle_delay_secs, 5);
        // Fields absent from the file fall back to their serde defaults.
        assert_eq!(config.retry_delay_secs, 10);
    }

    #[test]
    fn cli_override_beats_a_file_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"database_url = \"postgres://from-file\"\n").unwrap();

        let config = CompressorConfig::load(
            Some(file.path()),
            Some("postgres://cli-wins".to_string()),
        )
        .unwrap();
        assert_eq!(config.database_url, "postgres://cli-wins");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist.toml");
        let result = CompressorConfig::load(Some(&missing), None);
        assert!(result.is_err());
    }
}
