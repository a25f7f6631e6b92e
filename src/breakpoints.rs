//! CPCB breakpoint, category and safe-limit tables.
//!
//! This is the single source of truth for the numbers behind the AQI: the
//! per-pollutant concentration buckets, the six category bands, and the
//! reference limits shown next to raw readings. All other modules should
//! look values up here rather than hardcoding thresholds.

use std::fmt;

use crate::model::Pollutant;

// ---------------------------------------------------------------------------
// Breakpoints
// ---------------------------------------------------------------------------

/// One interpolation segment: concentrations in `[c_low, c_high]` map
/// linearly onto AQI values in `[aqi_low, aqi_high]`. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub c_low: f64,
    pub c_high: f64,
    pub aqi_low: u16,
    pub aqi_high: u16,
}

const fn bp(c_low: f64, c_high: f64, aqi_low: u16, aqi_high: u16) -> Breakpoint {
    Breakpoint {
        c_low,
        c_high,
        aqi_low,
        aqi_high,
    }
}

/// Buckets for a pollutant that participates in AQI computation.
pub struct PollutantBreakpoints {
    pub pollutant: Pollutant,
    /// Ordered ascending. The first matching bucket wins.
    pub buckets: &'static [Breakpoint],
}

/// Breakpoint tables, µg/m³. Integer-authored bounds leave gaps between
/// buckets (30 < c < 31 for PM2.5); concentrations in a gap match nothing.
pub static BREAKPOINT_TABLE: &[PollutantBreakpoints] = &[
    PollutantBreakpoints {
        pollutant: Pollutant::Pm2_5,
        buckets: &[
            bp(0.0, 30.0, 0, 50),
            bp(31.0, 60.0, 51, 100),
            bp(61.0, 90.0, 101, 200),
            bp(91.0, 120.0, 201, 300),
            bp(121.0, 250.0, 301, 400),
            bp(251.0, 350.0, 401, 500),
        ],
    },
    PollutantBreakpoints {
        pollutant: Pollutant::Pm10,
        buckets: &[
            bp(0.0, 50.0, 0, 50),
            bp(51.0, 100.0, 51, 100),
            bp(101.0, 250.0, 101, 200),
            bp(251.0, 350.0, 201, 300),
            bp(351.0, 430.0, 301, 400),
            bp(431.0, 500.0, 401, 500),
        ],
    },
    PollutantBreakpoints {
        pollutant: Pollutant::So2,
        buckets: &[
            bp(0.0, 40.0, 0, 50),
            bp(41.0, 80.0, 51, 100),
            bp(81.0, 380.0, 101, 200),
            bp(381.0, 800.0, 201, 300),
            bp(801.0, 1600.0, 301, 400),
            bp(1601.0, 2000.0, 401, 500),
        ],
    },
    PollutantBreakpoints {
        pollutant: Pollutant::No2,
        buckets: &[
            bp(0.0, 40.0, 0, 50),
            bp(41.0, 80.0, 51, 100),
            bp(81.0, 180.0, 101, 200),
            bp(181.0, 280.0, 201, 300),
            bp(281.0, 400.0, 301, 400),
            bp(401.0, 500.0, 401, 500),
        ],
    },
    PollutantBreakpoints {
        pollutant: Pollutant::O3,
        buckets: &[
            bp(0.0, 50.0, 0, 50),
            bp(51.0, 100.0, 51, 100),
            bp(101.0, 168.0, 101, 200),
            bp(169.0, 208.0, 201, 300),
            bp(209.0, 748.0, 301, 400),
            bp(749.0, 1000.0, 401, 500),
        ],
    },
];

/// Buckets for `pollutant`, or `None` if it does not participate in AQI.
pub fn buckets_for(pollutant: Pollutant) -> Option<&'static [Breakpoint]> {
    BREAKPOINT_TABLE
        .iter()
        .find(|t| t.pollutant == pollutant)
        .map(|t| t.buckets)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// CPCB AQI categories, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
}

impl Category {
    /// Display label, including the color marker.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Good => "🟢 Good",
            Category::Satisfactory => "🟡 Satisfactory",
            Category::Moderate => "🟠 Moderate",
            Category::Poor => "🔴 Poor",
            Category::VeryPoor => "🟣 Very Poor",
            Category::Severe => "⚫ Severe",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Category::Good => "Green",
            Category::Satisfactory => "Yellow",
            Category::Moderate => "Orange",
            Category::Poor => "Red",
            Category::VeryPoor => "Purple",
            Category::Severe => "Dark Gray",
        }
    }

    pub fn health_impact(&self) -> &'static str {
        match self {
            Category::Good => "Minimal impact",
            Category::Satisfactory => "Minor discomfort for sensitive people",
            Category::Moderate => "Breathing discomfort to sensitive groups",
            Category::Poor => "Discomfort on prolonged exposure",
            Category::VeryPoor => "Respiratory issues for most",
            Category::Severe => "Serious health effects, even on healthy people",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Label shown wherever a category cannot be determined.
pub const UNAVAILABLE: &str = "Unavailable";

/// Inclusive AQI bands, ascending, covering 0–500.
pub static CATEGORY_TABLE: &[(u16, u16, Category)] = &[
    (0, 50, Category::Good),
    (51, 100, Category::Satisfactory),
    (101, 200, Category::Moderate),
    (201, 300, Category::Poor),
    (301, 400, Category::VeryPoor),
    (401, 500, Category::Severe),
];

/// First band containing `aqi`, or `None` above 500.
pub fn category_for(aqi: u16) -> Option<Category> {
    CATEGORY_TABLE
        .iter()
        .find(|(low, high, _)| *low <= aqi && aqi <= *high)
        .map(|(_, _, category)| *category)
}

// ---------------------------------------------------------------------------
// Safe limits
// ---------------------------------------------------------------------------

/// CPCB reference limits in µg/m³, shown next to raw readings.
/// NO has no standalone limit; it only contributes to NOx.
pub static SAFE_LIMITS: &[(Pollutant, f64)] = &[
    (Pollutant::Co, 2000.0),
    (Pollutant::Nh3, 400.0),
    (Pollutant::No2, 80.0),
    (Pollutant::O3, 100.0),
    (Pollutant::Pm10, 100.0),
    (Pollutant::Pm2_5, 60.0),
    (Pollutant::So2, 80.0),
];

pub fn safe_limit(pollutant: Pollutant) -> Option<f64> {
    SAFE_LIMITS
        .iter()
        .find(|(p, _)| *p == pollutant)
        .map(|(_, limit)| *limit)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
