/// Error types for dataset loading
use thiserror::Error;

/// Errors raised while turning an uploaded CSV into readings.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The CSV itself could not be read
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A required header is absent
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    /// A data row has an unusable field (rows are counted from 1, after the header)
    #[error("Invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Type alias for Results using DatasetError
pub type Result<T> = std::result::Result<T, DatasetError>;
