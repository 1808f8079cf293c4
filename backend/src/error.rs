//! Error types for request assembly and submission.

use std::fmt;

/// Result type for RTML operations
pub type RtmlResult<T> = Result<T, RtmlError>;

/// Why a network exchange with the node agent failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// No reply within the configured timeout
    Timeout,
    /// Connection refused, reset or otherwise not established
    Connection,
    /// Non-success HTTP status from the endpoint
    Http { status: u16 },
    /// Reply body was not a usable SOAP envelope
    Envelope,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Timeout => write!(f, "timeout"),
            TransportFailure::Connection => write!(f, "connection"),
            TransportFailure::Http { status } => write!(f, "http status {}", status),
            TransportFailure::Envelope => write!(f, "envelope"),
        }
    }
}

/// Error type for building, sending and interpreting RTML documents
#[derive(Debug, thiserror::Error)]
pub enum RtmlError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Instrument configuration has no exposures with a non-zero count")]
    EmptyConfiguration,

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transmission error ({kind}): {message}")]
    TransmissionError {
        kind: TransportFailure,
        message: String,
    },

    #[error("Request rejected by remote service: {reason}")]
    RemoteRejection {
        reason: String,
        raw_response: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RtmlError {
    pub fn transmission(kind: TransportFailure, message: impl Into<String>) -> Self {
        RtmlError::TransmissionError {
            kind,
            message: message.into(),
        }
    }

    /// True for failures that happened on the wire rather than in the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, RtmlError::TransmissionError { .. })
    }
}
