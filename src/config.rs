//! Service configuration.
//!
//! Non-secret settings come from a TOML file (`airsense.toml` by default);
//! every section and key is optional and falls back to the defaults below.
//! Secrets never live in the file: the OpenWeather API key and the database
//! URL are read from the environment, with `.env` loaded through `dotenv`.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cities;
use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "airsense.toml";
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(String),
    MissingEnv(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Cannot read config {}: {}", path.display(), e),
            ConfigError::Parse(msg) => write!(f, "Invalid config: {}", msg),
            ConfigError::MissingEnv(var) => write!(f, "Environment variable {} is not set", var),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub geocoding_url: String,
    pub air_pollution_url: String,
    /// Upper bound on every HTTP request.
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            geocoding_url: "http://api.openweathermap.org/geo/1.0/direct".to_string(),
            air_pollution_url: "http://api.openweathermap.org/data/2.5/air_pollution".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBackend {
    File,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    pub backend: TrendBackend,
    /// JSON file used by the file backend.
    pub path: PathBuf,
    /// Number of most recent days shown in the trend.
    pub recent_days: usize,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            backend: TrendBackend::File,
            path: PathBuf::from("aqi_trend.json"),
            recent_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComparisonSettings {
    pub cities: Vec<String>,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            cities: cities::reference_city_names(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingSettings {
    pub fn min_level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse().map_err(ConfigError::Parse)
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderSettings,
    pub trend: TrendSettings,
    pub comparison: ComparisonSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.logging.min_level()?;
        Ok(config)
    }

    /// Loads `path`. A missing file yields the defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(path.to_path_buf(), e)),
        }
    }
}

/// Credentials for the OpenWeather APIs, passed explicitly to the client.
#[derive(Clone, PartialEq)]
pub struct ApiCredentials {
    pub api_key: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials").field("api_key", &"<redacted>").finish()
    }
}

impl ApiCredentials {
    /// Reads `OPENWEATHER_API_KEY` after loading `.env`, if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let api_key = env::var(API_KEY_VAR).map_err(|_| ConfigError::MissingEnv(API_KEY_VAR))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnv(API_KEY_VAR));
        }
        Ok(Self { api_key })
    }
}

/// Reads `DATABASE_URL` after loading `.env`, if present.
pub fn database_url_from_env() -> Result<String, ConfigError> {
    dotenv::dotenv().ok();
    env::var(DATABASE_URL_VAR).map_err(|_| ConfigError::MissingEnv(DATABASE_URL_VAR))
}
