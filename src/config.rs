//! Application configuration: file locations, quote endpoint, breathing pace
//! and date format.

use crate::breathing::DEFAULT_BREATH_INTERVAL;
use crate::quote::DEFAULT_QUOTE_URL;
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_FILE: &str = "mood_journal_entries.json";
pub const DEFAULT_LOG_FILE: &str = "mood_journal.log";
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";
pub const DEFAULT_QUOTE_TIMEOUT_SECS: u64 = 10;
pub const MAX_BREATH_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Journal JSON file. Read from MOOD_JOURNAL_DATA_FILE.
    #[serde(default)]
    pub data_file: Option<String>,

    /// Log output file. Read from MOOD_JOURNAL_LOG_FILE.
    #[serde(default)]
    pub log_file: Option<String>,

    /// Random-quote endpoint. Read from MOOD_JOURNAL_QUOTE_URL.
    #[serde(default)]
    pub quote_url: Option<String>,

    #[serde(default)]
    pub quote_timeout_secs: Option<u64>,

    /// Seconds per breathing phase. Read from MOOD_JOURNAL_BREATH_INTERVAL_SECS.
    #[serde(default)]
    pub breath_interval_secs: Option<u64>,

    /// strftime pattern for entry dates. Read from MOOD_JOURNAL_DATE_FORMAT.
    #[serde(default)]
    pub date_format: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("MOOD_JOURNAL").try_parsing(true));
        if let Ok(path) = std::env::var("MOOD_JOURNAL_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_file_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_file.as_deref().unwrap_or(DEFAULT_DATA_FILE))
    }

    pub fn log_file_or_default(&self) -> PathBuf {
        PathBuf::from(self.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE))
    }

    pub fn quote_url_or_default(&self) -> String {
        self.quote_url
            .clone()
            .unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string())
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_secs(
            self.quote_timeout_secs
                .unwrap_or(DEFAULT_QUOTE_TIMEOUT_SECS),
        )
    }

    /// Zero and anything above an hour count as unset.
    pub fn breath_interval(&self) -> Duration {
        match self.breath_interval_secs {
            Some(secs) if (1..=MAX_BREATH_INTERVAL_SECS).contains(&secs) => {
                Duration::from_secs(secs)
            }
            _ => DEFAULT_BREATH_INTERVAL,
        }
    }

    /// Returns the configured date pattern, or the default when it is unset
    /// or not a valid strftime string.
    pub fn date_format_or_default(&self) -> String {
        match self.date_format.as_deref() {
            Some(fmt) if is_valid_date_format(fmt) => fmt.to_string(),
            _ => DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

fn is_valid_date_format(fmt: &str) -> bool {
    !fmt.is_empty() && !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.data_file_or_default(), PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(cfg.log_file_or_default(), PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(cfg.quote_url_or_default(), DEFAULT_QUOTE_URL);
        assert_eq!(cfg.quote_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.breath_interval(), Duration::from_secs(4));
        assert_eq!(cfg.date_format_or_default(), DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn zero_breath_interval_uses_default() {
        let cfg = AppConfig {
            breath_interval_secs: Some(0),
            ..AppConfig::default()
        };
        assert_eq!(cfg.breath_interval(), DEFAULT_BREATH_INTERVAL);

        let cfg = AppConfig {
            breath_interval_secs: Some(6),
            ..AppConfig::default()
        };
        assert_eq!(cfg.breath_interval(), Duration::from_secs(6));
    }

    #[test]
    fn oversized_breath_interval_uses_default() {
        for secs in [MAX_BREATH_INTERVAL_SECS + 1, u64::MAX] {
            let cfg = AppConfig {
                breath_interval_secs: Some(secs),
                ..AppConfig::default()
            };
            assert_eq!(cfg.breath_interval(), DEFAULT_BREATH_INTERVAL);
        }

        let cfg = AppConfig {
            breath_interval_secs: Some(MAX_BREATH_INTERVAL_SECS),
            ..AppConfig::default()
        };
        assert_eq!(cfg.breath_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn invalid_date_format_falls_back() {
        let cfg = AppConfig {
            date_format: Some("%Y-%Q".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(cfg.date_format_or_default(), DEFAULT_DATE_FORMAT);

        let cfg = AppConfig {
            date_format: Some("%d.%m.%Y".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(cfg.date_format_or_default(), "%d.%m.%Y");
    }

    #[test]
    fn reads_from_a_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("journal.toml");
        std::fs::write(
            &path,
            "data_file = \"/tmp/entries.json\"\nbreath_interval_secs = 5\n",
        )
        .unwrap();

        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.data_file_or_default(), PathBuf::from("/tmp/entries.json"));
        assert_eq!(cfg.breath_interval(), Duration::from_secs(5));
    }
}
