//! Descriptive statistics of a city's temperature readings.

use serde::Serialize;
use sta_core::Reading;
use sta_utils::stats::{mean, quantile_sorted, sample_std_dev};

/// Count, moments and quartiles of a temperature sample.
///
/// Every field but `count` is `NaN` for an empty sample; `std` is also `NaN`
/// for a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// Rows as (label, value) pairs, in display order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

pub fn describe(readings: &[Reading]) -> DescriptiveStats {
    let mut temperatures: Vec<f64> = readings.iter().map(|r| r.temperature).collect();
    temperatures.sort_by(f64::total_cmp);
    DescriptiveStats {
        count: temperatures.len(),
        mean: mean(&temperatures),
        std: sample_std_dev(&temperatures),
        min: quantile_sorted(&temperatures, 0.0),
        q25: quantile_sorted(&temperatures, 0.25),
        median: quantile_sorted(&temperatures, 0.5),
        q75: quantile_sorted(&temperatures, 0.75),
        max: quantile_sorted(&temperatures, 1.0),
    }
}
