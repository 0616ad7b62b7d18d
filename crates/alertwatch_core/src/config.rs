//! Monitor configuration.
//!
//! # Responsibility
//! - Describe one monitoring run: feed, tracked route/phrase, assumed year,
//!   normalization switches and output locations.
//! - Load from a JSON file where every field is optional.
//!
//! # Invariants
//! - `assumed_year` is configuration, resolved by the caller; the normalizer
//!   never chooses a year.
//! - `validate()` must pass before a config drives a run.

use crate::feed::selector::{SelectionCriteria, SelectionPolicy};
use crate::logging::normalize_level;
use crate::period::normalizer::{NormalizeOptions, OvernightPolicy};
use crate::period::strategy::GRAMMAR_STRATEGY_ID;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_FEED_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/camsys%2Fsubway-alerts.json";
pub const DEFAULT_ROUTE_SORT_ORDER: &str = "MTASBWY:7:20";
pub const DEFAULT_HEADER_PHRASE: &str = "No [7] trains between";
pub const DEFAULT_PAGE_TITLE: &str = "7 train service changes";

const MIN_ASSUMED_YEAR: i32 = 1900;
const MAX_ASSUMED_YEAR: i32 = 9999;

/// Configuration loading/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings for one monitoring run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub feed_url: String,
    pub route_sort_order: String,
    pub header_phrase: String,
    /// Year applied to month/day tokens; `None` lets the caller choose.
    pub assumed_year: Option<i32>,
    pub selection_policy: SelectionPolicy,
    pub strict_tokens: bool,
    pub overnight_policy: OvernightPolicy,
    pub strategy: String,
    pub page_title: String,
    pub state_db_path: PathBuf,
    pub output_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            route_sort_order: DEFAULT_ROUTE_SORT_ORDER.to_string(),
            header_phrase: DEFAULT_HEADER_PHRASE.to_string(),
            assumed_year: None,
            selection_policy: SelectionPolicy::default(),
            strict_tokens: false,
            overnight_policy: OvernightPolicy::default(),
            strategy: GRAMMAR_STRATEGY_ID.to_string(),
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            state_db_path: PathBuf::from("alertwatch_state.sqlite3"),
            output_path: PathBuf::from("index.html"),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl MonitorConfig {
    /// Reads and parses a JSON config file. Does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&body)
    }

    pub fn from_json_str(body: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::Invalid("feed_url cannot be empty".to_string()));
        }
        if self.route_sort_order.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "route_sort_order cannot be empty".to_string(),
            ));
        }
        if self.header_phrase.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "header_phrase cannot be empty".to_string(),
            ));
        }
        if let Some(year) = self.assumed_year {
            if !(MIN_ASSUMED_YEAR..=MAX_ASSUMED_YEAR).contains(&year) {
                return Err(ConfigError::Invalid(format!(
                    "assumed_year {year} is outside {MIN_ASSUMED_YEAR}..={MAX_ASSUMED_YEAR}"
                )));
            }
        }
        if self.strategy.trim().is_empty() {
            return Err(ConfigError::Invalid("strategy cannot be empty".to_string()));
        }
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Returns `assumed_year`, or `fallback` when the config leaves it unset.
    pub fn resolved_year(&self, fallback: i32) -> i32 {
        self.assumed_year.unwrap_or(fallback)
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            strict_tokens: self.strict_tokens,
            overnight: self.overnight_policy,
        }
    }

    pub fn selection_criteria(&self) -> SelectionCriteria {
        SelectionCriteria {
            route_sort_order: self.route_sort_order.clone(),
            header_phrase: self.header_phrase.clone(),
            policy: self.selection_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, MonitorConfig, DEFAULT_ROUTE_SORT_ORDER};
    use crate::feed::selector::SelectionPolicy;
    use crate::period::normalizer::OvernightPolicy;

    #[test]
    fn empty_document_uses_defaults() {
        let config = MonitorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.route_sort_order, DEFAULT_ROUTE_SORT_ORDER);
        assert_eq!(config.resolved_year(2025), 2025);
        config.validate().unwrap();
    }

    #[test]
    fn document_overrides_fields() {
        let config = MonitorConfig::from_json_str(
            r#"{
                "assumed_year": 2024,
                "selection_policy": "route_and_phrase",
                "overnight_policy": "literal",
                "strict_tokens": true,
                "log_level": "WARN"
            }"#,
        )
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.resolved_year(2030), 2024);
        assert_eq!(config.selection_criteria().policy, SelectionPolicy::RouteAndPhrase);
        let options = config.normalize_options();
        assert!(options.strict_tokens);
        assert_eq!(options.overnight, OvernightPolicy::Literal);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = MonitorConfig::from_json_str(r#"{"year": 2025}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = MonitorConfig {
            assumed_year: Some(25),
            ..MonitorConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("assumed_year"));

        config.assumed_year = None;
        config.header_phrase = "  ".to_string();
        assert!(config.validate().is_err());

        config.header_phrase = "No [7]".to_string();
        config.log_level = "verbose".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("unsupported log level"));

        config.log_level = "info".to_string();
        config.log_dir = Some("relative/logs".into());
        assert!(config.validate().is_err());
    }
}
