//! Offline classification of a known temperature.

use crate::dataset::{ensure_city, load_readings};
use anyhow::anyhow;
use chrono::Local;
use sta_core::{reading::filter_city, Reading, Season};
use sta_data::{compute_seasonal_stats, CurrentConditions};

/// Classify `temperature` against `city`'s baseline for `season`.
pub fn classify_offline(
    readings: &[Reading],
    city: &str,
    temperature: f64,
    season: Season,
) -> anyhow::Result<CurrentConditions> {
    ensure_city(readings, city)?;
    let stats = compute_seasonal_stats(&filter_city(readings, city));
    Ok(CurrentConditions::assess(temperature, season, &stats, city))
}

/// Run the `classify` command. Without a month, today's season is used.
pub fn run_classify(csv: &str, city: &str, temperature: f64, month: Option<u32>) -> anyhow::Result<()> {
    let season = match month {
        Some(m) => Season::from_month(m).ok_or_else(|| anyhow!("Invalid month {}", m))?,
        None => Season::of(&Local::now().date_naive()),
    };
    let readings = load_readings(csv)?;
    let conditions = classify_offline(&readings, city, temperature, season)?;
    println!("{} ({} baseline for {})", conditions.message(), season, city);
    Ok(())
}
