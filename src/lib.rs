//! AirSense: CPCB Air Quality Index computation and reporting.
//!
//! Converts a snapshot of pollutant concentrations into an AQI, category and
//! dominant pollutant, derives health advisories, keeps a per-location daily
//! trend log, and compares a location against reference cities.
//!
//! Module map:
//! - `model`: shared types and errors.
//! - `breakpoints`: breakpoint, category and safe-limit tables.
//! - `analysis`: sub-index interpolation and aggregation.
//! - `alert`: advisory rules.
//! - `ingest`: provider traits and the OpenWeather client.
//! - `trend`: trend log stores.
//! - `cities`, `compare`: reference city comparison.
//! - `report`: the full request pipeline.
//! - `config`, `logging`: ambient configuration and logging.

pub mod alert;
pub mod analysis;
pub mod breakpoints;
pub mod cities;
pub mod compare;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod trend;
