//! Error types for NitroGIS

use thiserror::Error;

/// Main error type for NitroGIS operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Projection error: ({x}, {y}) {reason}")]
    Projection { x: f64, y: f64, reason: String },

    #[error("Resource limit exceeded: {what} = {requested} (limit {limit})")]
    ResourceLimit {
        what: &'static str,
        requested: u128,
        limit: u128,
    },

    #[error("Insufficient data: {valid} valid rows, at least {required} required")]
    InsufficientData { valid: usize, required: usize },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error aborts a whole sweep rather than a single power.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Cancelled | Error::ResourceLimit { .. } | Error::Projection { .. }
        )
    }
}

/// Result type alias for NitroGIS operations
pub type Result<T> = std::result::Result<T, Error>;
