//! The "fetch AQI" request pipeline.
//!
//! One request runs, in order: geocode, fetch the pollutant snapshot, assess
//! it, upsert today's AQI into the trend log, read the trend back, compare
//! against the reference cities, then derive advisories and pollutant
//! levels. The result is an `AqiReport` of plain data for whatever renders
//! it.
//!
//! If the location itself cannot be looked up, the report still carries the
//! comparison table and any earlier trend history, with the AQI section
//! marked unavailable.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::alert::recommendations::{Advisory, recommendations_for};
use crate::analysis::aqi::{AqiAssessment, AqiOutcome, assess};
use crate::analysis::levels::{PollutantLevel, pollutant_levels};
use crate::compare::{ComparisonRow, compare_cities};
use crate::ingest::{Geocoder, PollutionSource};
use crate::logging::{self, DataSource};
use crate::model::{Coordinates, LookupError, Pollutant, PollutantReading, TrendEntry};
use crate::trend::TrendLog;

// ---------------------------------------------------------------------------
// Single-location lookup
// ---------------------------------------------------------------------------

/// A resolved and assessed location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSnapshot {
    pub location: String,
    pub coordinates: Coordinates,
    pub reading: PollutantReading,
    pub assessment: AqiAssessment,
}

/// Geocode → fetch → assess for one location. Shared by the main request
/// and every comparison row.
pub fn lookup_location<P>(
    provider: &P,
    location: &str,
) -> Result<LocationSnapshot, LookupError>
where
    P: Geocoder + PollutionSource + ?Sized,
{
    let coordinates = provider.geocode(location)?;
    let reading = provider
        .fetch_reading(coordinates)
        .map_err(|source| LookupError::ProviderUnavailable {
            location: location.to_string(),
            source,
        })?;

    let assessment = assess(&reading);
    for (pollutant, concentration) in &assessment.excluded {
        logging::debug(
            DataSource::AirPollution,
            Some(location),
            &format!(
                "{} = {} matches no breakpoint; excluded from AQI",
                pollutant.label(),
                concentration
            ),
        );
    }

    Ok(LocationSnapshot {
        location: location.to_string(),
        coordinates,
        reading,
        assessment,
    })
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

/// The parts of a report that only exist when the location itself was
/// assessed.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDetail {
    pub coordinates: Coordinates,
    pub reading: PollutantReading,
    pub sub_indices: BTreeMap<Pollutant, u16>,
    pub levels: Vec<PollutantLevel>,
    pub advisories: Vec<Advisory>,
}

/// Everything the rendering layer needs for one "fetch AQI" action.
#[derive(Debug, Clone, PartialEq)]
pub struct AqiReport {
    pub location: String,
    pub date: NaiveDate,
    /// `Err` when this location could not be looked up. The trend and
    /// comparison sections are filled in either way.
    pub detail: Result<LocationDetail, LookupError>,
    /// Unavailable whenever `detail` is `Err`.
    pub outcome: AqiOutcome,
    /// Oldest first, at most `recent_days` entries.
    pub trend: Vec<TrendEntry>,
    /// Reference cities, then this location.
    pub comparison: Vec<ComparisonRow>,
}

pub struct AirSenseService<P> {
    provider: P,
    trend_log: TrendLog,
    reference_cities: Vec<String>,
    recent_days: usize,
}

impl<P> AirSenseService<P>
where
    P: Geocoder + PollutionSource + Sync,
{
    pub fn new(
        provider: P,
        trend_log: TrendLog,
        reference_cities: Vec<String>,
        recent_days: usize,
    ) -> Self {
        Self {
            provider,
            trend_log,
            reference_cities,
            recent_days,
        }
    }

    /// Builds the full report for `location` on `date`.
    ///
    /// Fails only with `LookupError::EmptyLocation`. A failed lookup for the
    /// location itself is carried in `AqiReport::detail`; the trend log is
    /// then left untouched but still read, and the comparison still runs.
    pub fn fetch_report(
        &mut self,
        location: &str,
        date: NaiveDate,
    ) -> Result<AqiReport, LookupError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LookupError::EmptyLocation);
        }

        let lookup = lookup_location(&self.provider, location).inspect_err(|e| {
            logging::log_lookup_failure(DataSource::AirPollution, location, "AQI lookup", e);
        });
        let outcome = match &lookup {
            Ok(snapshot) => snapshot.assessment.outcome,
            Err(_) => AqiOutcome::unavailable(),
        };

        // The upsert must land before the trend is read back.
        if let Some(aqi) = outcome.value {
            self.trend_log.record(&TrendEntry {
                date,
                location: location.to_string(),
                aqi,
            });
        }
        let trend = self.trend_log.recent(location, self.recent_days);

        let comparison =
            compare_cities(&self.provider, &self.reference_cities, location, &outcome);

        let detail = lookup.map(|snapshot| LocationDetail {
            coordinates: snapshot.coordinates,
            advisories: recommendations_for(&snapshot.reading),
            levels: pollutant_levels(&snapshot.reading),
            reading: snapshot.reading,
            sub_indices: snapshot.assessment.sub_indices,
        });

        Ok(AqiReport {
            location: location.to_string(),
            date,
            detail,
            outcome,
            trend,
            comparison,
        })
    }
}
