use thiserror::Error;

/// Failure of a single delivery attempt. Both kinds are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("Failed to parse timestamp '{value}': {reason}")]
    TimestampParse { value: String, reason: String },

    #[error("Timestamp '{0}' is outside the representable nanosecond range")]
    TimestampOutOfRange(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Failed to send data after {attempts} attempts: {last_error}")]
    DeliveryExhausted {
        attempts: u32,
        last_error: AttemptError,
    },

    #[error("Ingestion API answered {status} with a body that is not JSON: {reason}")]
    InvalidResponse { status: u16, reason: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ForwarderError {
    /// True for errors that abort before any request is sent.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            ForwarderError::TimestampParse { .. }
                | ForwarderError::TimestampOutOfRange(_)
                | ForwarderError::InvalidRecord(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ForwarderError>;
