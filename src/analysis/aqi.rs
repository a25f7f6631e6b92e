//! Sub-index interpolation and AQI aggregation.
//!
//! Each pollutant with a breakpoint table is mapped to its own sub-index by
//! linear interpolation inside the first bucket that contains its
//! concentration. The overall AQI is the largest sub-index; the pollutant
//! that produced it is the dominant pollutant.
//!
//! Concentrations outside every bucket are never clamped. They produce no
//! sub-index and are reported back in `AqiAssessment::excluded` so callers
//! can log them.

use std::collections::BTreeMap;

use crate::breakpoints::{self, Breakpoint, Category, UNAVAILABLE};
use crate::model::{Pollutant, PollutantReading};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Overall AQI for one snapshot.
///
/// Either all three fields are `Some` or all three are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AqiOutcome {
    pub value: Option<u16>,
    pub category: Option<Category>,
    pub dominant: Option<Pollutant>,
}

impl AqiOutcome {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.value.is_some()
    }

    /// Category label, or `"Unavailable"`.
    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.label()).unwrap_or(UNAVAILABLE)
    }

    /// Uppercased dominant pollutant, or an empty string.
    pub fn dominant_label(&self) -> String {
        self.dominant.map(|p| p.label()).unwrap_or_default()
    }
}

/// Full result of assessing a reading: the outcome plus the per-pollutant
/// detail it was derived from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AqiAssessment {
    pub outcome: AqiOutcome,
    /// Sub-index for every pollutant whose concentration matched a bucket.
    pub sub_indices: BTreeMap<Pollutant, u16>,
    /// Pollutants that have a table but whose concentration matched no bucket.
    pub excluded: Vec<(Pollutant, f64)>,
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Interpolates `concentration` across `buckets`.
///
/// Scans in table order and uses the first bucket with
/// `c_low <= concentration <= c_high`. Rounds half to even.
pub fn interpolate(concentration: f64, buckets: &[Breakpoint]) -> Option<u16> {
    let bucket = buckets
        .iter()
        .find(|b| b.c_low <= concentration && concentration <= b.c_high)?;

    let aqi_span = f64::from(bucket.aqi_high - bucket.aqi_low);
    let c_span = bucket.c_high - bucket.c_low;
    let aqi = aqi_span / c_span * (concentration - bucket.c_low) + f64::from(bucket.aqi_low);

    Some(aqi.round_ties_even() as u16)
}

/// Individual AQI for one pollutant, or `None` if the pollutant has no
/// breakpoint table or the concentration falls outside all of its buckets.
pub fn sub_index(pollutant: Pollutant, concentration: f64) -> Option<u16> {
    interpolate(concentration, breakpoints::buckets_for(pollutant)?)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Computes sub-indices for every pollutant in `reading` and derives the
/// overall outcome.
///
/// On equal maximum sub-indices the pollutant with the lexicographically
/// smallest identifier is dominant.
pub fn assess(reading: &PollutantReading) -> AqiAssessment {
    let mut sub_indices = BTreeMap::new();
    let mut excluded = Vec::new();

    for (pollutant, concentration) in reading.iter() {
        if breakpoints::buckets_for(pollutant).is_none() {
            continue;
        }
        match sub_index(pollutant, concentration) {
            Some(aqi) => {
                sub_indices.insert(pollutant, aqi);
            }
            None => excluded.push((pollutant, concentration)),
        }
    }

    // BTreeMap iterates in identifier order; a strict comparison keeps the
    // first of any equal maxima.
    let mut dominant: Option<(Pollutant, u16)> = None;
    for (pollutant, aqi) in &sub_indices {
        if dominant.is_none_or(|(_, best)| *aqi > best) {
            dominant = Some((*pollutant, *aqi));
        }
    }

    let outcome = dominant
        .and_then(|(pollutant, aqi)| {
            breakpoints::category_for(aqi).map(|category| AqiOutcome {
                value: Some(aqi),
                category: Some(category),
                dominant: Some(pollutant),
            })
        })
        .unwrap_or_default();

    AqiAssessment {
        outcome,
        sub_indices,
        excluded,
    }
}

/// Convenience wrapper returning only the overall outcome.
pub fn calculate_aqi(reading: &PollutantReading) -> AqiOutcome {
    assess(reading).outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
