//! Structured logging for the AirSense service.
//!
//! Provides context-rich logging with location identifiers, timestamps, and
//! severity levels. Supports both console output and file-based logging so
//! operators can see trend-log and provider problems after the fact.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::model::{LookupError, ProviderError};

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Log tags
// ---------------------------------------------------------------------------

/// Which part of the service a log line comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Geocoding,
    AirPollution,
    TrendLog,
    Comparison,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Geocoding => write!(f, "GEO"),
            DataSource::AirPollution => write!(f, "OWM"),
            DataSource::TrendLog => write!(f, "TREND"),
            DataSource::Comparison => write!(f, "CMP"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. a user typed a place the geocoder does not know
    Expected,
    /// Unexpected failure - indicates provider degradation or configuration issue
    Unexpected,
    /// Could be either, e.g. a 4xx other than 401
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Process-wide logger
// ---------------------------------------------------------------------------

/// Unset until `init_logger` runs; messages logged before that are dropped.
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    threshold: LogLevel,
    /// Every entry that passes `threshold` is also appended here.
    file: Option<String>,
    /// Full timestamped entries on stderr instead of the compact form.
    timestamps: bool,
}

impl Logger {
    /// Installs the process-wide logger, replacing any previous one.
    pub fn init(threshold: LogLevel, file: Option<String>, timestamps: bool) {
        let logger = Logger {
            threshold,
            file,
            timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn write_entry(
        &self,
        level: LogLevel,
        source: &DataSource,
        location: Option<&str>,
        message: &str,
    ) {
        if level < self.threshold {
            return;
        }

        let tag = match location {
            Some(location) => format!("{} [{}]", source, location),
            None => source.to_string(),
        };
        let stamped = format!(
            "{} {} {}: {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            level,
            tag,
            message
        );

        // stderr keeps stdout free for the report itself.
        match (level, self.timestamps) {
            (LogLevel::Debug, false) => {}
            (LogLevel::Info, _) | (LogLevel::Debug, true) => eprintln!("   {}", message),
            (_, true) => eprintln!("{}", stamped),
            (LogLevel::Error, false) => eprintln!("   ✗ {}: {}", tag, message),
            (LogLevel::Warning, false) => eprintln!("   ⚠ {}: {}", tag, message),
        }

        if let Some(path) = &self.file {
            let appended = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| writeln!(file, "{}", stamped));
            if let Err(e) = appended {
                eprintln!("Cannot append to log file {}: {}", path, e);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

pub fn init_logger(threshold: LogLevel, file: Option<&str>, timestamps: bool) {
    Logger::init(threshold, file.map(String::from), timestamps);
}

fn dispatch(level: LogLevel, source: DataSource, location: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.write_entry(level, &source, location, message);
        }
    }
}

pub fn info(source: DataSource, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, source, location, message);
}

/// Degraded but recoverable: a trend log write that failed, a flaky city.
pub fn warn(source: DataSource, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, source, location, message);
}

pub fn error(source: DataSource, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, source, location, message);
}

pub fn debug(source: DataSource, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, source, location, message);
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

/// Classify a provider failure by error kind.
pub fn classify_provider_failure(err: &ProviderError) -> FailureType {
    match err {
        // Timeouts and 5xx are the provider's problem, not the caller's.
        ProviderError::Timeout | ProviderError::Transport(_) => FailureType::Unexpected,
        ProviderError::HttpError(code) if *code >= 500 => FailureType::Unexpected,
        // 401 means the API key is wrong or missing.
        ProviderError::HttpError(401) => FailureType::Unexpected,
        ProviderError::HttpError(_) => FailureType::Unknown,
        // Schema drift in the provider response.
        ProviderError::ParseError(_) => FailureType::Unexpected,
        ProviderError::EmptyResponse => FailureType::Unknown,
    }
}

/// Classify a full lookup failure.
pub fn classify_lookup_failure(err: &LookupError) -> FailureType {
    match err {
        LookupError::EmptyLocation | LookupError::LocationNotFound(_) => FailureType::Expected,
        LookupError::ProviderUnavailable { source, .. } => classify_provider_failure(source),
    }
}

/// Logs a failed lookup at a level matching its classification: unknown
/// places only show up in debug output.
pub fn log_lookup_failure(source: DataSource, location: &str, operation: &str, err: &LookupError) {
    let failure_type = classify_lookup_failure(err);

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(location), &message),
        FailureType::Unexpected => error(source, Some(location), &message),
        FailureType::Unknown => warn(source, Some(location), &message),
    }
}

pub fn log_comparison_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "City comparison complete: {}/{} successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(DataSource::Comparison, None, &message);
    } else if successful == 0 {
        error(DataSource::Comparison, None, &message);
    } else {
        warn(DataSource::Comparison, None, &message);
    }
}
