//! Plain-text report printed by the `analyze` command.

use crate::analyze::AnalysisOutcome;
use sta_chart::dashboard::CurrentPanel;
use sta_data::{DescriptiveStats, SeasonalStatsTable};
use sta_utils::dates::format_timestamp;
use std::fmt::Write;

fn fmt_value(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "NaN".to_string()
    }
}

pub fn summary_table(summary: &DescriptiveStats) -> String {
    let mut out = String::new();
    for (label, value) in summary.rows() {
        let cell = if label == "count" {
            summary.count.to_string()
        } else {
            fmt_value(value)
        };
        let _ = writeln!(out, "  {:<6} {:>10}", label, cell);
    }
    out
}

pub fn profile_table(stats: &SeasonalStatsTable, city: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<7} {:>5} {:>9} {:>9} {:>9} {:>9}",
        "season", "n", "mean", "std", "low", "high"
    );
    for (season, s) in stats.for_city(city) {
        let _ = writeln!(
            out,
            "  {:<7} {:>5} {:>9} {:>9} {:>9} {:>9}",
            season.as_str(),
            s.count,
            fmt_value(s.mean_temp),
            fmt_value(s.std_temp),
            fmt_value(s.lower_bound()),
            fmt_value(s.upper_bound())
        );
    }
    out
}

pub fn render(outcome: &AnalysisOutcome) -> String {
    let analysis = &outcome.analysis;
    let mut out = String::new();
    let _ = writeln!(out, "Historical temperature analysis: {}", analysis.city);
    let _ = writeln!(out);
    let _ = writeln!(out, "Descriptive statistics (°C)");
    out.push_str(&summary_table(&analysis.summary));
    let _ = writeln!(out);
    let _ = writeln!(out, "Seasonal profile (°C, anomaly band = mean ± 2 std)");
    out.push_str(&profile_table(&analysis.stats, &analysis.city));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Anomalies: {} of {} readings",
        analysis.anomaly_count(),
        analysis.annotated.len()
    );
    for a in analysis.annotated.iter().filter(|a| a.is_anomaly) {
        let _ = writeln!(
            out,
            "  {}  {:<7} {:>8.2}",
            format_timestamp(&a.timestamp),
            a.season.as_str(),
            a.temperature
        );
    }
    match &outcome.current {
        Some(CurrentPanel::Conditions(conditions)) => {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", conditions.message());
        }
        Some(CurrentPanel::Unavailable(reason)) => {
            let _ = writeln!(out);
            let _ = writeln!(out, "Current weather unavailable: {}", reason);
        }
        None => {}
    }
    out
}
