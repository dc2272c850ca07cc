//! # Application Configuration
//!
//! Settings come from the environment (a `.env` file is loaded first by
//! `main`). Every setting has a default, so an empty environment works.
//!
//! | variable | default |
//! |---|---|
//! | `DATABASE_PATH` | `data/recipes.db` |
//! | `MEALPLANNER_LANG` | `de` |
//! | `OCR_LANGUAGES` | `deu+eng` |
//! | `HTTP_TIMEOUT_SECS` | `20` |
//! | `DEFAULT_SERVINGS` | `2` |
//! | `ROUNDING_POLICY_PATH` | built-in kitchen policy |
//! | `LOG_FORMAT` | `text` (`json` for structured output) |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::ocr_config::OcrConfig;
use crate::rounding::RoundingPolicy;

pub const DEFAULT_DATABASE_PATH: &str = "data/recipes.db";
pub const DEFAULT_LANGUAGE: &str = "de";
pub const DEFAULT_SERVINGS: u32 = 2;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Retry settings for fetching recipe pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Base delay, doubled on every retry
    pub base_delay_ms: u64,
    /// Upper bound for a single delay
    pub max_delay_ms: u64,
    /// Random extra delay added to each wait
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
            max_jitter_ms: 250,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms))
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            retry: RetryConfig::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// UI language code ("de", "en")
    pub language: String,
    /// Servings assumed when an imported recipe states none
    pub default_servings: u32,
    pub rounding: RoundingPolicy,
    pub ocr: OcrConfig,
    pub http: HttpConfig,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            language: DEFAULT_LANGUAGE.to_string(),
            default_servings: DEFAULT_SERVINGS,
            rounding: RoundingPolicy::kitchen(),
            ocr: OcrConfig::default(),
            http: HttpConfig::default(),
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("DATABASE_PATH").filter(|v| !v.trim().is_empty()) {
            config.database_path = PathBuf::from(path.trim());
        }
        if let Some(lang) = lookup("MEALPLANNER_LANG").filter(|v| !v.trim().is_empty()) {
            config.language = lang.trim().to_lowercase();
        }
        if let Some(languages) = lookup("OCR_LANGUAGES").filter(|v| !v.trim().is_empty()) {
            config.ocr = config.ocr.with_languages(languages.trim());
        }
        if let Some(value) = lookup("HTTP_TIMEOUT_SECS") {
            config.http.timeout_secs = parse_positive("HTTP_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("DEFAULT_SERVINGS") {
            config.default_servings = parse_positive("DEFAULT_SERVINGS", &value)?;
        }
        if let Some(path) = lookup("ROUNDING_POLICY_PATH").filter(|v| !v.trim().is_empty()) {
            config.rounding = RoundingPolicy::from_json_file(PathBuf::from(path.trim()).as_path())?;
        }
        if let Some(value) = lookup("LOG_FORMAT") {
            config.log_format = value.parse()?;
        }

        Ok(config)
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + From<u8>,
{
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed >= T::from(1) => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
