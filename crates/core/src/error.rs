//! Error types for the bandar analytics pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the bandar analytics pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Feed payload does not have the expected top-level shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Broker list missing, empty or not a list.
    #[error("No broker data: {0}")]
    NoBrokerData(String),

    /// A divisor (tick size) normalized to zero.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Integer arithmetic on normalized fields left the representable range.
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid analysis request.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed payload error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedPayload(msg.into())
    }

    /// Create a no broker data error.
    pub fn no_broker_data(msg: impl Into<String>) -> Self {
        Error::NoBrokerData(msg.into())
    }

    /// Create a division by zero error.
    pub fn division_by_zero(msg: impl Into<String>) -> Self {
        Error::DivisionByZero(msg.into())
    }

    /// Create a numeric overflow error.
    pub fn overflow(msg: impl Into<String>) -> Self {
        Error::NumericOverflow(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid query error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Error::InvalidQuery(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }

    /// Stable snake-case tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedPayload(_) => "malformed_payload",
            Error::NoBrokerData(_) => "no_broker_data",
            Error::DivisionByZero(_) => "division_by_zero",
            Error::NumericOverflow(_) => "numeric_overflow",
            Error::Config(_) => "config",
            Error::InvalidQuery(_) => "invalid_query",
            Error::Database(_) => "database",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}
