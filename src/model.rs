//! Core data types for the AirSense AQI service.
//!
//! This module defines the shared domain model imported by all other modules:
//! pollutant identifiers, readings, coordinates, trend entries and the error
//! types raised at the provider and storage boundaries. It contains no logic
//! beyond conversions and formatting.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pollutant identifiers
// ---------------------------------------------------------------------------

/// Pollutants reported by the air-pollution provider.
///
/// Variants are declared in lexicographic order of their identifiers so the
/// derived `Ord` matches identifier order. The AQI aggregator relies on this
/// to break ties between equal sub-indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "co")]
    Co,
    #[serde(rename = "nh3")]
    Nh3,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "no2")]
    No2,
    #[serde(rename = "o3")]
    O3,
    #[serde(rename = "pm10")]
    Pm10,
    #[serde(rename = "pm2_5")]
    Pm2_5,
    #[serde(rename = "so2")]
    So2,
}

impl Pollutant {
    pub const ALL: [Pollutant; 8] = [
        Pollutant::Co,
        Pollutant::Nh3,
        Pollutant::No,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::Pm10,
        Pollutant::Pm2_5,
        Pollutant::So2,
    ];

    /// Provider identifier, e.g. `"pm2_5"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Co => "co",
            Pollutant::Nh3 => "nh3",
            Pollutant::No => "no",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm2_5 => "pm2_5",
            Pollutant::So2 => "so2",
        }
    }

    /// Uppercased identifier used for display, e.g. `"PM2_5"`.
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Looks up a pollutant by provider identifier. Returns `None` for
    /// identifiers outside the known set.
    pub fn from_id(id: &str) -> Option<Pollutant> {
        Pollutant::ALL.iter().copied().find(|p| p.as_str() == id)
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single snapshot of pollutant concentrations for one location and time,
/// in µg/m³ as reported by the provider.
///
/// Keyed by `Pollutant`, so iteration is always in identifier order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollutantReading {
    concentrations: BTreeMap<Pollutant, f64>,
}

impl PollutantReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, convenient for tests and the offline CLI.
    pub fn with(mut self, pollutant: Pollutant, value: f64) -> Self {
        self.concentrations.insert(pollutant, value);
        self
    }

    pub fn insert(&mut self, pollutant: Pollutant, value: f64) {
        self.concentrations.insert(pollutant, value);
    }

    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        self.concentrations.get(&pollutant).copied()
    }

    /// Concentration of `pollutant`, or 0.0 when the provider omitted it.
    pub fn get_or_zero(&self, pollutant: Pollutant) -> f64 {
        self.get(pollutant).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        self.concentrations.iter().map(|(p, v)| (*p, *v))
    }

    pub fn len(&self) -> usize {
        self.concentrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concentrations.is_empty()
    }
}

impl FromIterator<(Pollutant, f64)> for PollutantReading {
    fn from_iter<I: IntoIterator<Item = (Pollutant, f64)>>(iter: I) -> Self {
        Self {
            concentrations: iter.into_iter().collect(),
        }
    }
}

/// WGS84 position returned by the geocoding provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// Trend log
// ---------------------------------------------------------------------------

/// One day's AQI for one location. The trend log holds at most one entry
/// per (location, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub date: NaiveDate,
    pub location: String,
    pub aqi: u16,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when talking to the OpenWeather APIs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Non-2xx HTTP response.
    HttpError(u16),
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Connection-level failure (DNS, TLS, reset).
    Transport(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The response parsed but held no usable data.
    EmptyResponse,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(code) => write!(f, "HTTP error: {}", code),
            ProviderError::Timeout => write!(f, "Request timeout"),
            ProviderError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ProviderError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ProviderError::EmptyResponse => write!(f, "No data in provider response"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if let Some(status) = err.status() {
            ProviderError::HttpError(status.as_u16())
        } else if err.is_decode() {
            ProviderError::ParseError(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Failure to resolve a location name into an AQI outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    /// The location name was blank after trimming.
    EmptyLocation,
    /// The geocoder returned no match for the name.
    LocationNotFound(String),
    /// Geocoding or pollution data could not be retrieved.
    ProviderUnavailable {
        location: String,
        source: ProviderError,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::EmptyLocation => write!(f, "No location given"),
            LookupError::LocationNotFound(name) => write!(f, "No location found for '{}'", name),
            LookupError::ProviderUnavailable { location, source } => {
                write!(f, "Air quality data unavailable for '{}': {}", location, source)
            }
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::EmptyLocation | LookupError::LocationNotFound(_) => None,
            LookupError::ProviderUnavailable { source, .. } => Some(source),
        }
    }
}

/// Errors from a trend log backend.
#[derive(Debug)]
pub enum TrendError {
    Io(std::io::Error),
    /// The backing file exists but does not hold a valid trend log.
    Corrupt(String),
    Database(postgres::Error),
}

impl fmt::Display for TrendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendError::Io(e) => write!(f, "Trend log I/O error: {}", e),
            TrendError::Corrupt(msg) => write!(f, "Trend log corrupt: {}", msg),
            TrendError::Database(e) => write!(f, "Trend log database error: {}", e),
        }
    }
}

impl std::error::Error for TrendError {}

impl From<std::io::Error> for TrendError {
    fn from(err: std::io::Error) -> Self {
        TrendError::Io(err)
    }
}

impl From<postgres::Error> for TrendError {
    fn from(err: postgres::Error) -> Self {
        TrendError::Database(err)
    }
}
