//! Seasonal baselines and anomaly labelling.

use log::debug;
use serde::Serialize;
use sta_core::{Reading, Season};
use sta_utils::stats::{mean, sample_std_dev};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Readings further than this many standard deviations from the seasonal
/// mean are anomalies.
pub const ANOMALY_SIGMAS: f64 = 2.0;

/// Mean and sample standard deviation of one (city, season) group.
///
/// `std_temp` is `NaN` for a group with a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonalStats {
    pub mean_temp: f64,
    pub std_temp: f64,
    pub count: usize,
}

impl SeasonalStats {
    pub fn from_temperatures(temperatures: &[f64]) -> Self {
        SeasonalStats {
            mean_temp: mean(temperatures),
            std_temp: sample_std_dev(temperatures),
            count: temperatures.len(),
        }
    }

    pub fn lower_bound(&self) -> f64 {
        self.mean_temp - ANOMALY_SIGMAS * self.std_temp
    }

    pub fn upper_bound(&self) -> f64 {
        self.mean_temp + ANOMALY_SIGMAS * self.std_temp
    }

    /// True when `temperature` lies strictly outside the two-sigma band.
    ///
    /// A baseline without a finite mean and standard deviation never flags
    /// anything.
    pub fn is_anomalous(&self, temperature: f64) -> bool {
        if !self.mean_temp.is_finite() || !self.std_temp.is_finite() {
            return false;
        }
        temperature < self.lower_bound() || temperature > self.upper_bound()
    }

    /// True when `temperature` lies inside the two-sigma band, edges included.
    /// Always false when either bound is `NaN`.
    pub fn within_band(&self, temperature: f64) -> bool {
        self.lower_bound() <= temperature && temperature <= self.upper_bound()
    }
}

/// Seasonal statistics keyed by (city, season), iterated in city then
/// calendar order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonalStatsTable(BTreeMap<(String, Season), SeasonalStats>);

impl SeasonalStatsTable {
    pub fn get(&self, city: &str, season: Season) -> Option<&SeasonalStats> {
        self.0.get(&(city.to_string(), season))
    }

    pub fn insert(&mut self, city: &str, season: Season, stats: SeasonalStats) {
        self.0.insert((city.to_string(), season), stats);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Season, &SeasonalStats)> {
        self.0
            .iter()
            .map(|((city, season), stats)| (city.as_str(), *season, stats))
    }

    /// Seasons observed for `city`, in calendar order.
    pub fn for_city<'a>(&'a self, city: &'a str) -> impl Iterator<Item = (Season, &'a SeasonalStats)> + 'a {
        self.iter()
            .filter(move |(c, _, _)| *c == city)
            .map(|(_, season, stats)| (season, stats))
    }
}

/// Group readings by (city, season) and compute each group's statistics.
pub fn compute_seasonal_stats(readings: &[Reading]) -> SeasonalStatsTable {
    let mut groups: BTreeMap<(String, Season), Vec<f64>> = BTreeMap::new();
    for reading in readings {
        groups
            .entry((reading.city.clone(), reading.season))
            .or_default()
            .push(reading.temperature);
    }
    let table = groups
        .into_iter()
        .map(|(key, temperatures)| {
            let stats = SeasonalStats::from_temperatures(&temperatures);
            debug!(
                "{} {}: n={} mean={:.2} std={:.2}",
                key.0, key.1, stats.count, stats.mean_temp, stats.std_temp
            );
            (key, stats)
        })
        .collect();
    SeasonalStatsTable(table)
}

/// A reading with its seasonal baseline and anomaly label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedReading {
    pub city: String,
    pub timestamp: chrono::NaiveDateTime,
    pub season: Season,
    pub temperature: f64,
    pub mean_temp: f64,
    pub std_temp: f64,
    pub is_anomaly: bool,
}

/// A reading's (city, season) has no entry in the statistics table.
///
/// Only happens when the table was built from different readings.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("no seasonal statistics for {city} in {season}")]
pub struct MissingStatsError {
    pub city: String,
    pub season: Season,
}

/// Join every reading with its seasonal statistics and label anomalies.
/// Output order follows input order.
pub fn annotate(
    readings: &[Reading],
    stats: &SeasonalStatsTable,
) -> Result<Vec<AnnotatedReading>, MissingStatsError> {
    readings
        .iter()
        .map(|reading| {
            let baseline = stats
                .get(&reading.city, reading.season)
                .ok_or_else(|| MissingStatsError {
                    city: reading.city.clone(),
                    season: reading.season,
                })?;
            Ok(AnnotatedReading {
                city: reading.city.clone(),
                timestamp: reading.timestamp,
                season: reading.season,
                temperature: reading.temperature,
                mean_temp: baseline.mean_temp,
                std_temp: baseline.std_temp,
                is_anomaly: baseline.is_anomalous(reading.temperature),
            })
        })
        .collect()
}

/// How a live temperature compares with the historical seasonal baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Normal,
    Anomalous,
    NoBaseline,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Classification::Normal => "normal",
            Classification::Anomalous => "anomalous",
            Classification::NoBaseline => "no baseline",
        })
    }
}

/// Classify `current_temp` against the (city, season) baseline.
///
/// Only a temperature inside the band is `Normal`, so a baseline with an
/// undefined standard deviation classifies everything as `Anomalous`.
pub fn classify_current(
    current_temp: f64,
    season: Season,
    stats: &SeasonalStatsTable,
    city: &str,
) -> Classification {
    match stats.get(city, season) {
        None => Classification::NoBaseline,
        Some(baseline) if baseline.within_band(current_temp) => Classification::Normal,
        Some(_) => Classification::Anomalous,
    }
}
