//! The `analyze` command: one selection in, report and dashboard files out.

use crate::{
    dataset::{ensure_city, load_readings},
    report,
};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use log::{error, info};
use sta_chart::dashboard::{CurrentPanel, DashboardPage};
use sta_core::{
    weather::{OpenWeatherMap, WeatherConfig, WeatherError, WeatherLookup},
    Reading,
};
use sta_data::{analyze, assess_current, CityAnalysis};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const TIME_SERIES_FILE: &str = "time_series.vl.json";
pub const SEASONAL_PROFILE_FILE: &str = "seasonal_profile.vl.json";
pub const DASHBOARD_FILE: &str = "dashboard.html";

/// Inputs for one `analyze` invocation.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub csv: String,
    pub city: String,
    pub api_key: Option<String>,
    pub out_dir: PathBuf,
    pub annotated_csv: Option<String>,
    pub weather: WeatherConfig,
}

/// The computed analysis plus whatever was learned about the current weather.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: CityAnalysis,
    pub current: Option<CurrentPanel>,
}

/// User-facing text for a failed weather lookup.
pub fn weather_failure_message(err: &WeatherError) -> String {
    match err {
        WeatherError::Unauthorized => "Invalid OpenWeatherMap API key.".to_string(),
        WeatherError::Status(code) => format!("Error fetching current weather (code {}).", code),
        WeatherError::Transport(reason) => {
            format!("Could not reach the weather service: {}", reason)
        }
        WeatherError::Parse(reason) => format!("Unexpected weather response: {}", reason),
    }
}

/// Analyze `city` and, when a lookup and key are given, classify the current
/// temperature for `today`'s season. A failed lookup is reported in the
/// outcome rather than failing the analysis.
pub async fn analyze_selection<W: WeatherLookup>(
    readings: &[Reading],
    city: &str,
    weather: Option<(&W, &str)>,
    today: NaiveDate,
) -> anyhow::Result<AnalysisOutcome> {
    ensure_city(readings, city)?;
    let analysis = analyze(readings, city)?;
    let current = match weather {
        None => None,
        Some((lookup, api_key)) => {
            match assess_current(lookup, api_key, today, &analysis.stats, city).await {
                Ok(conditions) => Some(CurrentPanel::Conditions(conditions)),
                Err(e) => {
                    error!("Current weather for {} unavailable: {}", city, e);
                    Some(CurrentPanel::Unavailable(weather_failure_message(&e)))
                }
            }
        }
    };
    Ok(AnalysisOutcome { analysis, current })
}

/// Write both chart specs and the dashboard page into `out_dir`, plus the
/// annotated readings when a CSV path is given. Returns the written paths.
pub fn write_outputs(
    outcome: &AnalysisOutcome,
    out_dir: &Path,
    annotated_csv: Option<&str>,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let page = DashboardPage {
        analysis: &outcome.analysis,
        current: outcome.current.clone(),
    };

    let mut written = Vec::new();
    let files = [
        (TIME_SERIES_FILE, serde_json::to_string_pretty(&page.time_series_spec())?),
        (SEASONAL_PROFILE_FILE, serde_json::to_string_pretty(&page.seasonal_profile_spec())?),
        (DASHBOARD_FILE, page.render()),
    ];
    for (name, contents) in files {
        let path = out_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if let Some(csv_path) = annotated_csv {
        let mut wtr = csv::Writer::from_path(csv_path)
            .with_context(|| format!("Failed to create {}", csv_path))?;
        for row in &outcome.analysis.annotated {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        written.push(PathBuf::from(csv_path));
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

/// Run the `analyze` command end to end.
pub async fn run_analyze(options: &AnalyzeOptions) -> anyhow::Result<()> {
    let readings = load_readings(&options.csv)?;
    let lookup = OpenWeatherMap::new(options.weather.clone())?;
    let api_key = options
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty());
    let today = Local::now().date_naive();

    let outcome =
        analyze_selection(&readings, &options.city, api_key.map(|key| (&lookup, key)), today).await?;
    print!("{}", report::render(&outcome));
    write_outputs(&outcome, &options.out_dir, options.annotated_csv.as_deref())?;

    info!(
        "Analysis complete. Output: {}",
        options.out_dir.join(DASHBOARD_FILE).display()
    );
    Ok(())
}
