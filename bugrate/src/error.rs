//! Error types for aggregation and report generation

use thiserror::Error;

/// Errors raised while turning a snapshot into charts
#[derive(Debug, Error)]
pub enum Error {
    /// x/y lengths differ while assembling a series. This is an aggregation
    /// bug, so the chart that hit it must not be rendered.
    #[error("series '{name}': x/y data length mismatch ({x_len} dates, {y_len} values)")]
    ShapeMismatch {
        name: String,
        x_len: usize,
        y_len: usize,
    },

    /// Dates of a series are not in ascending order
    #[error("series '{name}': date at position {index} is earlier than the one before it")]
    UnorderedSeries { name: String, index: usize },

    /// A first/last date was requested from an empty map
    #[error("no data available: {0}")]
    NotAvailable(&'static str),

    /// A date threshold could not be parsed
    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    /// A chart was assembled without any series
    #[error("chart '{0}' has no series")]
    NoSeries(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
