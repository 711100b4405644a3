//! Vega-Lite chart specs.
//!
//! Specs carry their data inline so a page can hand them straight to
//! `vegaEmbed`. Undefined statistics serialize as `null`.

use serde_json::{json, Value};
use sta_core::Season;
use sta_data::{AnnotatedReading, SeasonalStatsTable};
use sta_utils::dates::format_timestamp;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

const NORMAL_COLOR: &str = "blue";
const ANOMALY_COLOR: &str = "red";

fn finite_or_null(value: f64) -> Value {
    if value.is_finite() {
        json!(value)
    } else {
        Value::Null
    }
}

/// Temperature over time: a line through normal readings, red circles on anomalies.
pub fn anomaly_time_series(annotated: &[AnnotatedReading], city: &str) -> Value {
    let values: Vec<Value> = annotated
        .iter()
        .map(|a| {
            json!({
                "timestamp": format_timestamp(&a.timestamp),
                "temperature": a.temperature,
                "season": a.season,
                "mean_temp": finite_or_null(a.mean_temp),
                "std_temp": finite_or_null(a.std_temp),
                "is_anomaly": a.is_anomaly,
            })
        })
        .collect();

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": format!("Temperature time series with anomalies: {}", city),
        "width": "container",
        "height": 320,
        "data": { "values": values },
        "encoding": {
            "x": { "field": "timestamp", "type": "temporal", "title": "Date" },
            "y": { "field": "temperature", "type": "quantitative", "title": "Temperature (°C)" },
        },
        "layer": [
            {
                "params": [{ "name": "zoom", "select": "interval", "bind": "scales" }],
                "mark": { "type": "line", "color": NORMAL_COLOR },
                "transform": [{ "filter": "datum.is_anomaly == false" }],
            },
            {
                "mark": { "type": "circle", "color": ANOMALY_COLOR, "size": 60 },
                "transform": [{ "filter": "datum.is_anomaly == true" }],
                "encoding": {
                    "tooltip": [
                        { "field": "timestamp", "type": "temporal" },
                        { "field": "temperature", "type": "quantitative" },
                        { "field": "season", "type": "nominal" },
                    ],
                },
            },
        ],
    })
}

/// Seasonal mean as bars with a one-standard-deviation error bar, in
/// calendar order, for the seasons observed in `city`.
pub fn seasonal_profile(stats: &SeasonalStatsTable, city: &str) -> Value {
    let values: Vec<Value> = stats
        .for_city(city)
        .map(|(season, s)| {
            json!({
                "season": season,
                "mean_temp": finite_or_null(s.mean_temp),
                "std_temp": finite_or_null(s.std_temp),
                "count": s.count,
            })
        })
        .collect();
    let season_order: Vec<&str> = Season::ALL.iter().map(Season::as_str).collect();

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": format!("Seasonal profile (mean and standard deviation): {}", city),
        "width": "container",
        "height": 320,
        "data": { "values": values },
        "encoding": {
            "x": { "field": "season", "type": "nominal", "sort": season_order, "title": "Season" },
        },
        "layer": [
            {
                "params": [{ "name": "zoom", "select": "interval", "bind": "scales" }],
                "mark": "bar",
                "encoding": {
                    "y": { "field": "mean_temp", "type": "quantitative", "title": "Mean temperature (°C)" },
                    "color": { "field": "season", "type": "nominal", "sort": season_order },
                },
            },
            {
                "mark": "errorbar",
                "encoding": {
                    "y": { "field": "mean_temp", "type": "quantitative" },
                    "yError": { "field": "std_temp" },
                },
            },
        ],
    })
}
