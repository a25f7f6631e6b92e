//! Upstream data providers.
//!
//! The rest of the crate talks to providers only through the `Geocoder` and
//! `PollutionSource` traits, so the pipeline and comparator can run against
//! fakes in tests. `openweather` holds the production implementation.

use crate::model::{Coordinates, LookupError, PollutantReading, ProviderError};

pub mod openweather;

/// Resolves a place name to coordinates.
pub trait Geocoder {
    /// Returns `LookupError::LocationNotFound` when the provider has no match
    /// and `LookupError::ProviderUnavailable` when the call itself failed.
    fn geocode(&self, location: &str) -> Result<Coordinates, LookupError>;
}

/// Fetches the current pollutant snapshot at a position.
pub trait PollutionSource {
    fn fetch_reading(&self, at: Coordinates) -> Result<PollutantReading, ProviderError>;
}
