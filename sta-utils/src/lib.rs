//! Shared utility functions for STA crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

    /// Timestamp layouts accepted in addition to RFC 3339, tried in order.
    const DATE_TIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    /// Format a timestamp as "YYYY-MM-DDTHH:MM:SS", the layout chart specs expect.
    pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
        timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// Parse an ISO-style timestamp.
    ///
    /// Accepts RFC 3339 (the offset is dropped, keeping wall-clock time),
    /// date-time with a `T` or space separator, and a bare `YYYY-MM-DD`,
    /// which is read as midnight.
    pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, DateError> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.naive_local());
        }
        for format in DATE_TIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(dt);
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_err(|_| DateError(s.to_string()))
    }

}

/// Numeric summaries over temperature samples.
///
/// Undefined results are reported as `NaN` rather than errors so that callers
/// can carry them through tables unchanged.
pub mod stats {
    /// Arithmetic mean; `NaN` for an empty slice.
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Sample standard deviation (n - 1 denominator); `NaN` below two values.
    pub fn sample_std_dev(values: &[f64]) -> f64 {
        if values.len() < 2 {
            return f64::NAN;
        }
        let m = mean(values);
        let sum_sq = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
        (sum_sq / (values.len() - 1) as f64).sqrt()
    }

    /// Quantile `q` in `[0, 1]` of an ascending slice, interpolating linearly
    /// between the two closest ranks. `NaN` for an empty slice.
    pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
        if sorted.is_empty() {
            return f64::NAN;
        }
        let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = pos.ceil() as usize;
        let frac = pos - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_mean() {
            assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
            assert!(mean(&[]).is_nan());
        }

        #[test]
        fn test_sample_std_dev() {
            let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
            assert!((sd - 2.138089935299395).abs() < 1e-12);
            assert!(sample_std_dev(&[5.0]).is_nan());
            assert!(sample_std_dev(&[]).is_nan());
        }

        #[test]
        fn test_quantile_interpolates() {
            let sorted = [1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0];
            assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
            assert_eq!(quantile_sorted(&sorted, 0.25), 1.75);
            assert_eq!(quantile_sorted(&sorted, 0.5), 3.5);
            assert_eq!(quantile_sorted(&sorted, 0.75), 5.25);
            assert_eq!(quantile_sorted(&sorted, 1.0), 9.0);
            assert!(quantile_sorted(&[], 0.5).is_nan());
        }
    }
}

/// Error types
pub mod error {
    use thiserror::Error;

    /// A timestamp string matched none of the accepted layouts.
    #[derive(Debug, Error, PartialEq)]
    #[error("Date error: unrecognised timestamp {0:?}")]
    pub struct DateError(pub String);
}
