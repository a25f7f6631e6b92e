//! Health advisories derived from pollutant exposure.
//!
//! Submodules:
//! - `recommendations`: fixed threshold rules mapped to advisory text.

pub mod recommendations;
