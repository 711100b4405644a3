use crate::{
    error::{DatasetError, Result},
    season::Season,
};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Column names every dataset must carry.
pub const CITY_COLUMN: &str = "city";
pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const SEASON_COLUMN: &str = "season";
pub const TEMPERATURE_COLUMN: &str = "temperature";

/// One historical temperature observation for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub season: Season,
    /// Degrees Celsius
    pub temperature: f64,
}

/// Positions of the required columns within a header row.
struct ColumnIndex {
    city: usize,
    timestamp: usize,
    season: usize,
    temperature: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(DatasetError::MissingColumn(name))
        };
        Ok(ColumnIndex {
            city: find(CITY_COLUMN)?,
            timestamp: find(TIMESTAMP_COLUMN)?,
            season: find(SEASON_COLUMN)?,
            temperature: find(TEMPERATURE_COLUMN)?,
        })
    }
}

impl Reading {
    /// Parse a CSV string with a header row into readings.
    ///
    /// Columns are located by name, so order and extra columns do not matter.
    /// Rows whose temperature is blank or not a finite number are skipped as
    /// missing measurements; any other malformed field is an error.
    pub fn parse_csv(csv_object: &str) -> Result<Vec<Reading>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(csv_object.as_bytes());
        let columns = ColumnIndex::from_headers(rdr.headers()?)?;

        let mut readings = Vec::new();
        let mut skipped = 0usize;
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let row = i + 1;
            let field = |idx: usize, name: &'static str| {
                record.get(idx).ok_or_else(|| DatasetError::InvalidRow {
                    row,
                    reason: format!("missing {name} field"),
                })
            };

            let temperature = match field(columns.temperature, TEMPERATURE_COLUMN)?.parse::<f64>() {
                Ok(t) if t.is_finite() => t,
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let city = field(columns.city, CITY_COLUMN)?;
            if city.is_empty() {
                return Err(DatasetError::InvalidRow {
                    row,
                    reason: "empty city".to_string(),
                });
            }
            let timestamp = sta_utils::dates::parse_timestamp(field(columns.timestamp, TIMESTAMP_COLUMN)?)
                .map_err(|e| DatasetError::InvalidRow {
                    row,
                    reason: e.to_string(),
                })?;
            let season = field(columns.season, SEASON_COLUMN)?
                .parse::<Season>()
                .map_err(|e| DatasetError::InvalidRow {
                    row,
                    reason: e.to_string(),
                })?;

            readings.push(Reading {
                city: city.to_string(),
                timestamp,
                season,
                temperature,
            });
        }

        if skipped > 0 {
            warn!("Skipped {} rows without a numeric temperature", skipped);
        }
        info!("Loaded {} readings", readings.len());
        Ok(readings)
    }
}

/// Distinct city names, sorted.
pub fn cities(readings: &[Reading]) -> Vec<String> {
    readings
        .iter()
        .map(|r| r.city.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Readings belonging to `city`, in their original order.
pub fn filter_city(readings: &[Reading], city: &str) -> Vec<Reading> {
    readings.iter().filter(|r| r.city == city).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"city,timestamp,temperature,season
Berlin,2010-01-01,-2.5,winter
Berlin,2010-07-01,21.0,summer
Moscow,2010-01-01,-12.0,winter
Cairo,2010-04-15 12:00:00,27.25,spring
"#;

    #[test]
    fn test_parse_csv() {
        let readings = Reading::parse_csv(SAMPLE).unwrap();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0].city, "Berlin");
        assert_eq!(
            readings[0].timestamp,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(readings[0].season, Season::Winter);
        assert_eq!(readings[0].temperature, -2.5);
        assert_eq!(readings[3].season, Season::Spring);
        assert_eq!(readings[3].temperature, 27.25);
    }

    #[test]
    fn test_parse_csv_headers_case_insensitive_with_extra_columns() {
        let csv = "ID, City ,Season,Timestamp,Temperature\n1,Oslo,autumn,2011-10-10,4.0\n";
        let readings = Reading::parse_csv(csv).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].city, "Oslo");
        assert_eq!(readings[0].season, Season::Autumn);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let csv = "city,timestamp,season\nOslo,2011-10-10,autumn\n";
        match Reading::parse_csv(csv) {
            Err(DatasetError::MissingColumn(name)) => assert_eq!(name, "temperature"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_csv_skips_missing_temperature() {
        let csv = "city,timestamp,season,temperature\nOslo,2011-10-10,autumn,\nOslo,2011-10-11,autumn,NaN\nOslo,2011-10-12,autumn,3.5\n";
        let readings = Reading::parse_csv(csv).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].temperature, 3.5);
    }

    #[test]
    fn test_parse_csv_reports_bad_row() {
        let csv = "city,timestamp,season,temperature\nOslo,2011-10-10,autumn,1.0\nOslo,2011-10-11,monsoon,2.0\n";
        match Reading::parse_csv(csv) {
            Err(DatasetError::InvalidRow { row, reason }) => {
                assert_eq!(row, 2);
                assert!(reason.contains("monsoon"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn test_cities_sorted_and_unique() {
        let readings = Reading::parse_csv(SAMPLE).unwrap();
        assert_eq!(cities(&readings), vec!["Berlin", "Cairo", "Moscow"]);
    }

    #[test]
    fn test_filter_city_keeps_order() {
        let readings = Reading::parse_csv(SAMPLE).unwrap();
        let berlin = filter_city(&readings, "Berlin");
        assert_eq!(berlin.len(), 2);
        assert_eq!(berlin[0].season, Season::Winter);
        assert_eq!(berlin[1].season, Season::Summer);
        assert!(filter_city(&readings, "Paris").is_empty());
    }
}
