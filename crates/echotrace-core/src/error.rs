//! Error types for EchoTrace.

use thiserror::Error;

/// Main error type for EchoTrace operations.
#[derive(Error, Debug)]
pub enum EchoTraceError {
    /// The contour mask has no foreground or does not yield a usable boundary.
    #[error("Invalid mask: {0}")]
    InvalidMask(String),

    /// A contour source the normalizer cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No frames to track")]
    MissingFrames,

    #[error("No contours to track")]
    MissingContours,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Tracking run cancelled")]
    Cancelled,

    #[error("A tracking run is already active")]
    WorkerBusy,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for EchoTrace operations.
pub type Result<T> = std::result::Result<T, EchoTraceError>;
