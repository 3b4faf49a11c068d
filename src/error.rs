// Error taxonomy shared by loading, configuration and time parsing.
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading data, building the engine or parsing times.
#[derive(Error, Debug)]
pub enum OutageError {
    /// The dataset file does not exist. Fatal: nothing can be replayed or reported.
    #[error("Dataset not found: {0}")]
    DatasetMissing(PathBuf),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cause pattern from the configuration is not a valid regular expression.
    #[error("Invalid cause pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// A time string that is unknown or not a valid time of day.
    #[error("Malformed time: {0:?}")]
    MalformedTime(String),

    /// The record's calendar fields do not form a real date.
    #[error("Invalid date: {year}-{month}-{day}")]
    InvalidDate { year: i32, month: i32, day: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OutageError>;
