//! Pipeline configuration.
//!
//! Settings live in `config/config.json`. Every section and field has a
//! default, so a partial file (or no file) is valid. `FRED_API_KEY` and
//! `SEC_USER_AGENT` in the environment take precedence over the file.

use crate::layout::DataLayout;
use crate::universe::{Company, CompanyUniverse};
use finsent_data::fred::is_usable_api_key;
use finsent_model::{LEXICON_BASE_MODEL, TrainingArgs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// SEC user agent used when none is configured.
pub const DEFAULT_SEC_USER_AGENT: &str = "Your Name (your.email@example.com)";

/// Environment variable overriding `api_keys.fred`.
pub const FRED_API_KEY_ENV: &str = "FRED_API_KEY";

/// Environment variable overriding `user_agents.sec`.
pub const SEC_USER_AGENT_ENV: &str = "SEC_USER_AGENT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid JSON for this layout.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A setting required by the requested stage is absent.
    #[error("Missing configuration key: {0}")]
    MissingKey(&'static str),

    /// A setting is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// API credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    /// FRED API key.
    pub fred: Option<String>,
}

/// HTTP user agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAgents {
    /// User agent sent to SEC EDGAR. EDGAR rejects anonymous clients.
    pub sec: String,
}

impl Default for UserAgents {
    fn default() -> Self {
        Self {
            sec: DEFAULT_SEC_USER_AGENT.to_string(),
        }
    }
}

/// Minimum seconds between requests, per service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimits {
    /// SEC EDGAR
    pub sec: f64,
    /// FRED economic indicators
    pub fred: f64,
    /// Policy uncertainty series
    pub policy: f64,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            sec: 0.1,
            fred: 0.1,
            policy: 1.0,
        }
    }
}

impl RateLimits {
    /// SEC interval.
    pub fn sec_interval(&self) -> Duration {
        Duration::from_secs_f64(self.sec)
    }

    /// FRED interval.
    pub fn fred_interval(&self) -> Duration {
        Duration::from_secs_f64(self.fred)
    }

    /// Policy uncertainty interval.
    pub fn policy_interval(&self) -> Duration {
        Duration::from_secs_f64(self.policy)
    }
}

/// Fine-tuning settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base model: `builtin:finance-lexicon` or a checkpoint directory.
    pub base_model: String,
    /// Name recorded in the saved model and report.
    pub model_name: String,
    /// Where the fine-tuned model is written. Defaults to
    /// `{data_dir}/finetuned_models/{model_name}`.
    pub output_dir: Option<PathBuf>,
    /// Hyperparameters.
    pub training_args: TrainingArgs,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_model: LEXICON_BASE_MODEL.to_string(),
            model_name: "financial_llm".to_string(),
            output_dir: None,
            training_args: TrainingArgs::default(),
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of raw and processed data.
    pub data_dir: PathBuf,
    /// SQLite response cache. Defaults to the user cache directory.
    pub cache_path: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_path: None,
        }
    }
}

impl PathsConfig {
    /// Resolved cache database path.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| self.data_dir.join("cache"))
                .join("finsent")
                .join("finsent.db")
        })
    }
}

/// What the collection stage downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Filings kept per form type per company.
    pub filings_per_type: usize,
    /// Companies fetched concurrently.
    pub concurrency: usize,
    /// Form types to collect.
    pub form_types: Vec<String>,
    /// Companies to collect. Defaults to the built-in list.
    pub companies: Option<Vec<Company>>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            filings_per_type: 10,
            concurrency: 4,
            form_types: vec!["10-K".to_string(), "10-Q".to_string(), "8-K".to_string()],
            companies: None,
        }
    }
}

impl CollectionConfig {
    /// Companies to collect.
    pub fn universe(&self) -> CompanyUniverse {
        CompanyUniverse::from_companies(self.companies.clone().unwrap_or_default())
    }
}

/// Full configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials
    pub api_keys: ApiKeys,
    /// HTTP user agents
    pub user_agents: UserAgents,
    /// Request pacing
    pub rate_limits: RateLimits,
    /// Fine-tuning
    pub model: ModelConfig,
    /// Filesystem locations
    pub paths: PathsConfig,
    /// Collection scope
    pub collection: CollectionConfig,
}

impl Config {
    /// Parse configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&body)
    }

    /// Load from `path` if it exists, else use defaults. Environment
    /// overrides are applied and the result is validated.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(FRED_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_keys.fred = Some(key);
        }
        if let Some(agent) = lookup(SEC_USER_AGENT_ENV).filter(|a| !a.trim().is_empty()) {
            self.user_agents.sec = agent;
        }
    }

    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("rate_limits.sec", self.rate_limits.sec),
            ("rate_limits.fred", self.rate_limits.fred),
            ("rate_limits.policy", self.rate_limits.policy),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number of seconds"
                )));
            }
        }
        if self.collection.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "collection.concurrency must be at least 1".to_string(),
            ));
        }
        if self.collection.form_types.is_empty() {
            return Err(ConfigError::Invalid(
                "collection.form_types must not be empty".to_string(),
            ));
        }
        if self.user_agents.sec.trim().is_empty() {
            return Err(ConfigError::MissingKey("user_agents.sec"));
        }
        self.model
            .training_args
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// FRED API key, if one is set and is not the placeholder.
    pub fn fred_api_key(&self) -> Option<&str> {
        self.api_keys
            .fred
            .as_deref()
            .filter(|key| is_usable_api_key(key))
    }

    /// Data layout rooted at `paths.data_dir`.
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.paths.data_dir)
    }

    /// Directory the fine-tuned model is written to and loaded from.
    pub fn model_dir(&self) -> PathBuf {
        self.model
            .output_dir
            .clone()
            .unwrap_or_else(|| self.layout().model_dir(&self.model.model_name))
    }

    /// Whether the SEC user agent is still the example value.
    pub fn uses_default_user_agent(&self) -> bool {
        self.user_agents.sec == DEFAULT_SEC_USER_AGENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.user_agents.sec, DEFAULT_SEC_USER_AGENT);
        assert_eq!(config.rate_limits.policy, 1.0);
        assert_eq!(config.collection.filings_per_type, 10);
        assert_eq!(config.collection.universe().companies().len(), 10);
        assert_eq!(config.model.training_args.num_train_epochs, 3);
        assert_eq!(
            config.model_dir(),
            PathBuf::from("data/finetuned_models/financial_llm")
        );
        assert!(config.fred_api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_json_str(
            r#"{
                "api_keys": {"fred": "abc123"},
                "rate_limits": {"sec": 0.5},
                "model": {"training_args": {"num_train_epochs": 5}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.fred_api_key(), Some("abc123"));
        assert_eq!(config.rate_limits.sec_interval(), Duration::from_millis(500));
        assert_eq!(config.rate_limits.fred, 0.1);
        assert_eq!(config.model.training_args.num_train_epochs, 5);
        assert_eq!(config.model.training_args.learning_rate, TrainingArgs::default().learning_rate);
        assert_eq!(config.paths.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_model_dir_follows_data_dir() {
        let mut config = Config::default();
        config.paths.data_dir = PathBuf::from("/srv/finsent");
        config.model.model_name = "v2".to_string();
        assert_eq!(config.model_dir(), PathBuf::from("/srv/finsent/finetuned_models/v2"));

        config.model.output_dir = Some(PathBuf::from("models/custom"));
        assert_eq!(config.model_dir(), PathBuf::from("models/custom"));
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let example = include_str!("../../../config/config.example.json");
        let config = Config::from_json_str(example).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.fred_api_key().is_none());
        assert!(config.uses_default_user_agent());
        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.collection, CollectionConfig::default());
        assert_eq!(config.rate_limits, RateLimits::default());
    }

    #[rstest]
    #[case("YOUR_FRED_API_KEY_HERE")]
    #[case("")]
    fn test_placeholder_key_is_unusable(#[case] key: &str) {
        let config = Config {
            api_keys: ApiKeys {
                fred: Some(key.to_string()),
            },
            ..Config::default()
        };
        assert!(config.fred_api_key().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            FRED_API_KEY_ENV => Some("from-env".to_string()),
            SEC_USER_AGENT_ENV => Some("Jane Doe jane@example.com".to_string()),
            _ => None,
        });
        assert_eq!(config.fred_api_key(), Some("from-env"));
        assert!(!config.uses_default_user_agent());
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert!(config.uses_default_user_agent());
        assert!(config.api_keys.fred.is_none());
    }

    #[rstest]
    #[case(r#"{"rate_limits": {"sec": -1.0}}"#)]
    #[case(r#"{"collection": {"concurrency": 0}}"#)]
    #[case(r#"{"collection": {"form_types": []}}"#)]
    #[case(r#"{"user_agents": {"sec": " "}}"#)]
    #[case(r#"{"model": {"training_args": {"validation_split": 1.5}}}"#)]
    fn test_validate_rejects(#[case] json: &str) {
        let config = Config::from_json_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"collection": {"filings_per_type": 2}}"#).unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.collection.filings_per_type, 2);

        let missing = Config::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(missing.collection.filings_per_type, 10);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
