//! Command implementations for STA CLI.
//!
//! Provides subcommands for listing the cities in a dataset, analysing one
//! city's seasonal anomalies, and classifying a known temperature offline.

use clap::Subcommand;
use sta_core::weather::{WeatherConfig, DEFAULT_WEATHER_URL};
use std::{path::PathBuf, time::Duration};

pub mod analyze;
pub mod classify;
pub mod dataset;
pub mod report;

#[derive(Subcommand)]
pub enum Command {
    /// List the cities present in a dataset
    Cities {
        /// Path to the readings CSV (optionally .gz)
        #[arg(short = 'c', long)]
        csv: String,
    },

    /// Compute seasonal statistics and anomalies for one city
    Analyze {
        /// Path to the readings CSV (optionally .gz)
        #[arg(short = 'c', long)]
        csv: String,

        /// City to analyze
        #[arg(long)]
        city: String,

        /// OpenWeatherMap API key; enables current temperature classification
        #[arg(long, env = "OPENWEATHERMAP_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Directory for the chart specs and dashboard page
        #[arg(short = 'o', long, default_value = "dashboard")]
        out_dir: PathBuf,

        /// Also write the annotated readings to this CSV
        #[arg(long)]
        annotated_csv: Option<String>,

        /// Current weather endpoint
        #[arg(long, default_value = DEFAULT_WEATHER_URL)]
        weather_url: String,

        /// Weather request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },

    /// Classify a temperature against a city's historical seasonal baseline
    Classify {
        /// Path to the readings CSV (optionally .gz)
        #[arg(short = 'c', long)]
        csv: String,

        /// City whose baseline to use
        #[arg(long)]
        city: String,

        /// Temperature in degrees Celsius
        #[arg(short = 't', long, allow_negative_numbers = true)]
        temperature: f64,

        /// Month (1-12) selecting the season; defaults to the current month
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Cities { csv } => dataset::run_cities(&csv),
        Command::Analyze {
            csv,
            city,
            api_key,
            out_dir,
            annotated_csv,
            weather_url,
            timeout_secs,
        } => {
            let options = analyze::AnalyzeOptions {
                csv,
                city,
                api_key,
                out_dir,
                annotated_csv,
                weather: WeatherConfig {
                    base_url: weather_url,
                    timeout: Duration::from_secs(timeout_secs),
                    ..WeatherConfig::default()
                },
            };
            analyze::run_analyze(&options).await
        }
        Command::Classify {
            csv,
            city,
            temperature,
            month,
        } => classify::run_classify(&csv, &city, temperature, month),
    }
}
