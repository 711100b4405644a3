//! Chart specs and the dashboard page for a city analysis.
//!
//! This crate provides:
//! - `vega`: Vega-Lite specs for the anomaly time series and seasonal profile
//! - `dashboard`: a standalone HTML page that embeds both specs via vega-embed

pub mod dashboard;
pub mod vega;
