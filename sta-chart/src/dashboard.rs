//! Standalone HTML dashboard.
//!
//! The page template is embedded at compile time; chart specs are inlined as
//! JSON literals and rendered by vega-embed when the page loads.

use crate::vega::{anomaly_time_series, seasonal_profile};
use serde_json::Value;
use sta_data::{CityAnalysis, Classification, CurrentConditions, DescriptiveStats};

static DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

/// What to show about the live temperature, if anything was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentPanel {
    Conditions(CurrentConditions),
    /// The lookup failed; the message says why.
    Unavailable(String),
}

/// Inputs for one rendered page.
pub struct DashboardPage<'a> {
    pub analysis: &'a CityAnalysis,
    pub current: Option<CurrentPanel>,
}

impl DashboardPage<'_> {
    pub fn time_series_spec(&self) -> Value {
        anomaly_time_series(&self.analysis.annotated, &self.analysis.city)
    }

    pub fn seasonal_profile_spec(&self) -> Value {
        seasonal_profile(&self.analysis.stats, &self.analysis.city)
    }

    pub fn render(&self) -> String {
        let analysis = self.analysis;
        let title = escape_html(&format!("Historical temperature analysis: {}", analysis.city));
        let overview = format!(
            "{} readings across {} seasons, {} flagged as anomalies (more than two standard deviations from the seasonal mean).",
            analysis.readings.len(),
            analysis.stats.len(),
            analysis.anomaly_count()
        );
        DASHBOARD_HTML
            .replace("{{TITLE}}", &title)
            .replace("{{OVERVIEW}}", &overview)
            .replace("{{CURRENT}}", &self.current_html())
            .replace("{{SUMMARY_ROWS}}", &summary_rows(&analysis.summary))
            .replace("{{TIME_SERIES_SPEC}}", &script_json(&self.time_series_spec()))
            .replace("{{SEASONAL_PROFILE_SPEC}}", &script_json(&self.seasonal_profile_spec()))
    }

    fn current_html(&self) -> String {
        let (class, message) = match &self.current {
            None => return String::new(),
            Some(CurrentPanel::Conditions(conditions)) => {
                let class = match conditions.classification {
                    Classification::Normal => "normal",
                    Classification::Anomalous => "anomalous",
                    Classification::NoBaseline => "no-baseline",
                };
                (class, conditions.message())
            }
            Some(CurrentPanel::Unavailable(reason)) => ("error", reason.clone()),
        };
        format!(
            "<div class=\"current {}\">{}</div>",
            class,
            escape_html(&message)
        )
    }
}

fn summary_rows(summary: &DescriptiveStats) -> String {
    summary
        .rows()
        .iter()
        .map(|(label, value)| {
            let cell = if *label == "count" {
                format!("{}", summary.count)
            } else if value.is_finite() {
                format!("{:.2}", value)
            } else {
                "NaN".to_string()
            };
            format!("<tr><th>{}</th><td>{}</td></tr>", label, cell)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a spec for inclusion inside a `<script>` element. `<` only
/// occurs inside JSON strings, where `\u003c` is an equivalent escape.
fn script_json(spec: &Value) -> String {
    serde_json::to_string(spec)
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sta_core::{Reading, Season};
    use sta_data::analyze;

    fn analysis(city: &str) -> CityAnalysis {
        let readings: Vec<Reading> = [1.0, 3.0, 2.0]
            .iter()
            .enumerate()
            .map(|(i, t)| Reading {
                city: city.to_string(),
                timestamp: NaiveDate::from_ymd_opt(2022, 12, i as u32 + 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                season: Season::Winter,
                temperature: *t,
            })
            .collect();
        analyze(&readings, city).unwrap()
    }

    #[test]
    fn test_render_embeds_both_charts() {
        let analysis = analysis("Berlin");
        let html = DashboardPage {
            analysis: &analysis,
            current: None,
        }
        .render();
        assert!(html.contains("<title>Historical temperature analysis: Berlin</title>"));
        assert!(html.contains("vegaEmbed('#time-series', {"));
        assert!(html.contains("vegaEmbed('#seasonal-profile', {"));
        assert!(html.contains("<tr><th>count</th><td>3</td></tr>"));
        assert!(html.contains("<tr><th>50%</th><td>2.00</td></tr>"));
        assert!(html.contains("3 readings across 1 seasons, 0 flagged"));
        assert!(!html.contains("{{"));
        assert!(!html.contains("class=\"current"));
    }

    #[test]
    fn test_render_current_conditions() {
        let analysis = analysis("Berlin");
        let conditions = CurrentConditions::assess(30.0, Season::Winter, &analysis.stats, "Berlin");
        let html = DashboardPage {
            analysis: &analysis,
            current: Some(CurrentPanel::Conditions(conditions)),
        }
        .render();
        assert!(html.contains("<div class=\"current anomalous\">Current temperature is anomalous: 30 °C</div>"));
    }

    #[test]
    fn test_render_unavailable_and_escaping() {
        let analysis = analysis("<Springfield>");
        let html = DashboardPage {
            analysis: &analysis,
            current: Some(CurrentPanel::Unavailable("invalid API key".to_string())),
        }
        .render();
        assert!(html.contains("<div class=\"current error\">invalid API key</div>"));
        assert!(html.contains("&lt;Springfield&gt;"));
        assert!(!html.contains("<Springfield>"));
    }
}
