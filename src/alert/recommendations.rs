//! Pollutant threshold checks and the advisories they trigger.
//!
//! Each rule compares one exposure value against a fixed threshold and, when
//! exceeded (strictly greater than), contributes one advisory. Rules are
//! independent; any number may fire. Output order follows rule priority, not
//! the order values were supplied in.

use std::fmt;

use crate::model::{Pollutant, PollutantReading};

/// Exposure values the rules are evaluated against, µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Exposure {
    pub pm2_5: f64,
    pub pm10: f64,
    pub o3: f64,
    /// Combined NO + NO2.
    pub nox: f64,
    pub so2: f64,
    pub co: f64,
}

impl Exposure {
    /// Missing pollutants count as zero.
    pub fn from_reading(reading: &PollutantReading) -> Self {
        Self {
            pm2_5: reading.get_or_zero(Pollutant::Pm2_5),
            pm10: reading.get_or_zero(Pollutant::Pm10),
            o3: reading.get_or_zero(Pollutant::O3),
            nox: reading.get_or_zero(Pollutant::No) + reading.get_or_zero(Pollutant::No2),
            so2: reading.get_or_zero(Pollutant::So2),
            co: reading.get_or_zero(Pollutant::Co),
        }
    }
}

/// Advisories, declared in rule priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Advisory {
    HighPm2_5,
    HighPm10,
    HighOzone,
    HighNox,
    HighSo2,
    HighCo,
    /// Emitted alone when no rule fires.
    AllClear,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::HighPm2_5 => {
                "😷 PM2.5 is high – Avoid outdoor activity and use an N95 mask."
            }
            Advisory::HighPm10 => {
                "🚫 PM10 exceeds safe limits – Avoid dusty areas and construction zones."
            }
            Advisory::HighOzone => "🌞 Ozone is high – Stay indoors during afternoon hours.",
            Advisory::HighNox => "🚦 NOx is elevated – Avoid high-traffic areas.",
            Advisory::HighSo2 => "🧪 SO₂ is high – People with asthma should stay indoors.",
            Advisory::HighCo => "☠️ CO is high – Avoid enclosed or poorly ventilated areas.",
            Advisory::AllClear => {
                "✅ All pollutant levels are within safe limits. Enjoy your day!"
            }
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub const PM2_5_THRESHOLD: f64 = 60.0;
pub const PM10_THRESHOLD: f64 = 100.0;
pub const O3_THRESHOLD: f64 = 100.0;
pub const NOX_THRESHOLD: f64 = 80.0;
pub const SO2_THRESHOLD: f64 = 80.0;
pub const CO_THRESHOLD: f64 = 2000.0;

/// Returns the advisories for `exposure`. Never empty.
pub fn recommendations(exposure: &Exposure) -> Vec<Advisory> {
    let rules = [
        (exposure.pm2_5 > PM2_5_THRESHOLD, Advisory::HighPm2_5),
        (exposure.pm10 > PM10_THRESHOLD, Advisory::HighPm10),
        (exposure.o3 > O3_THRESHOLD, Advisory::HighOzone),
        (exposure.nox > NOX_THRESHOLD, Advisory::HighNox),
        (exposure.so2 > SO2_THRESHOLD, Advisory::HighSo2),
        (exposure.co > CO_THRESHOLD, Advisory::HighCo),
    ];

    let mut advisories: Vec<Advisory> = rules
        .into_iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, advisory)| advisory)
        .collect();

    if advisories.is_empty() {
        advisories.push(Advisory::AllClear);
    }
    advisories
}

/// Convenience wrapper for a raw reading.
pub fn recommendations_for(reading: &PollutantReading) -> Vec<Advisory> {
    recommendations(&Exposure::from_reading(reading))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
