//! Raw pollutant values paired with their CPCB reference limits.

use crate::breakpoints;
use crate::model::{Pollutant, PollutantReading};

/// One row of the "live pollutant values" table.
#[derive(Debug, Clone, PartialEq)]
pub struct PollutantLevel {
    pub pollutant: Pollutant,
    /// µg/m³
    pub value: f64,
    pub limit: Option<f64>,
}

impl PollutantLevel {
    /// True when a limit is defined and the value is strictly above it.
    pub fn exceeds(&self) -> bool {
        self.limit.is_some_and(|limit| self.value > limit)
    }
}

/// One level per pollutant present in `reading`, in identifier order.
pub fn pollutant_levels(reading: &PollutantReading) -> Vec<PollutantLevel> {
    reading
        .iter()
        .map(|(pollutant, value)| PollutantLevel {
            pollutant,
            value,
            limit: breakpoints::safe_limit(pollutant),
        })
        .collect()
}
