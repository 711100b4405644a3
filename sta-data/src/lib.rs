//! Seasonal statistics and anomaly detection for city temperature readings.
//!
//! Every function here is a pure transform of its inputs: selecting another
//! city or loading another dataset means calling [`analyze`] again and
//! discarding the previous [`CityAnalysis`].

pub mod describe;
pub mod seasonal;

pub use describe::{describe, DescriptiveStats};
pub use seasonal::{
    annotate, classify_current, compute_seasonal_stats, AnnotatedReading, Classification,
    MissingStatsError, SeasonalStats, SeasonalStatsTable,
};

use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use sta_core::{
    reading::filter_city,
    weather::{WeatherError, WeatherLookup},
    Reading, Season,
};

/// Everything computed for one selected city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityAnalysis {
    pub city: String,
    pub readings: Vec<Reading>,
    pub stats: SeasonalStatsTable,
    pub annotated: Vec<AnnotatedReading>,
    pub summary: DescriptiveStats,
}

impl CityAnalysis {
    pub fn anomaly_count(&self) -> usize {
        self.annotated.iter().filter(|a| a.is_anomaly).count()
    }
}

/// Filter the dataset to `city` and compute its baselines, labels and summary.
///
/// Statistics come from the selected city's rows only.
pub fn analyze(readings: &[Reading], city: &str) -> Result<CityAnalysis, MissingStatsError> {
    let readings = filter_city(readings, city);
    let stats = compute_seasonal_stats(&readings);
    let annotated = annotate(&readings, &stats)?;
    let summary = describe(&readings);
    let analysis = CityAnalysis {
        city: city.to_string(),
        readings,
        stats,
        annotated,
        summary,
    };
    info!(
        "{}: {} readings, {} seasons, {} anomalies",
        city,
        analysis.readings.len(),
        analysis.stats.len(),
        analysis.anomaly_count()
    );
    Ok(analysis)
}

/// A live temperature classified against the seasonal baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub season: Season,
    pub classification: Classification,
}

impl CurrentConditions {
    pub fn assess(temperature: f64, season: Season, stats: &SeasonalStatsTable, city: &str) -> Self {
        CurrentConditions {
            temperature,
            season,
            classification: classify_current(temperature, season, stats, city),
        }
    }

    /// One-line message for display.
    pub fn message(&self) -> String {
        match self.classification {
            Classification::Normal => {
                format!("Current temperature is normal: {} °C", self.temperature)
            }
            Classification::Anomalous => {
                format!("Current temperature is anomalous: {} °C", self.temperature)
            }
            Classification::NoBaseline => format!(
                "No historical data for the current season ({}); current temperature: {} °C",
                self.season, self.temperature
            ),
        }
    }
}

/// Look up the current temperature for `city` and classify it against the
/// baseline of the season containing `today`.
pub async fn assess_current<W: WeatherLookup>(
    lookup: &W,
    api_key: &str,
    today: NaiveDate,
    stats: &SeasonalStatsTable,
    city: &str,
) -> Result<CurrentConditions, WeatherError> {
    let temperature = lookup.current_temperature(city, api_key).await?;
    Ok(CurrentConditions::assess(temperature, Season::of(&today), stats, city))
}
