//! AQI computation for a single pollutant snapshot.
//!
//! Everything here is a pure function of a `PollutantReading`; no I/O and
//! no state survives between calls.
//!
//! Submodules:
//! - `aqi`: sub-index interpolation, dominant pollutant and category.
//! - `levels`: raw readings paired with their reference limits.

pub mod aqi;
pub mod levels;
