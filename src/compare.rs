//! Side-by-side AQI comparison against reference cities.
//!
//! Each reference city goes through the same geocode → fetch → assess
//! pipeline as the user's own location. Lookups run concurrently on scoped
//! threads; they share nothing but the provider. A failure for one city
//! degrades that row to 0 / "Unavailable" and never touches the others.

use std::thread;

use crate::analysis::aqi::AqiOutcome;
use crate::breakpoints::{Category, UNAVAILABLE};
use crate::ingest::{Geocoder, PollutionSource};
use crate::logging::{self, DataSource};
use crate::model::LookupError;
use crate::report::lookup_location;

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub location: String,
    /// 0 when the AQI could not be determined.
    pub aqi: u16,
    pub category: Option<Category>,
}

impl ComparisonRow {
    pub fn from_outcome(location: &str, outcome: &AqiOutcome) -> Self {
        Self {
            location: location.to_string(),
            aqi: outcome.value.unwrap_or(0),
            category: outcome.category,
        }
    }

    pub fn unavailable(location: &str) -> Self {
        Self::from_outcome(location, &AqiOutcome::unavailable())
    }

    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.label()).unwrap_or(UNAVAILABLE)
    }
}

/// Builds the comparison table: one row per reference city in the given
/// order, followed by the user's own row.
pub fn compare_cities<P>(
    provider: &P,
    references: &[String],
    own_location: &str,
    own_outcome: &AqiOutcome,
) -> Vec<ComparisonRow>
where
    P: Geocoder + PollutionSource + Sync,
{
    let results: Vec<Option<Result<AqiOutcome, LookupError>>> = thread::scope(|scope| {
        let handles: Vec<_> = references
            .iter()
            .map(|city| {
                scope.spawn(move || lookup_location(provider, city).map(|s| s.assessment.outcome))
            })
            .collect();

        // A panicking lookup yields None rather than tearing down the batch.
        handles.into_iter().map(|h| h.join().ok()).collect()
    });

    let mut rows = Vec::with_capacity(references.len() + 1);
    let mut failed = 0;

    for (city, result) in references.iter().zip(results) {
        match result {
            Some(Ok(outcome)) => rows.push(ComparisonRow::from_outcome(city, &outcome)),
            Some(Err(e)) => {
                failed += 1;
                logging::log_lookup_failure(DataSource::Comparison, city, "Comparison lookup", &e);
                rows.push(ComparisonRow::unavailable(city));
            }
            None => {
                failed += 1;
                logging::error(DataSource::Comparison, Some(city), "Comparison lookup panicked");
                rows.push(ComparisonRow::unavailable(city));
            }
        }
    }

    logging::log_comparison_summary(references.len(), references.len() - failed, failed);

    rows.push(ComparisonRow::from_outcome(own_location, own_outcome));
    rows
}
