use std::fmt;

/// Result type for Phalanx operations
pub type Result<T> = std::result::Result<T, PhalanxError>;

/// Main error type for the Phalanx library
///
/// Shape-contract violations inside a forward pass are not represented here:
/// they are integration bugs and panic at the point of mismatch.
#[derive(Debug, Clone)]
pub enum PhalanxError {
    /// Invalid dimensions between related arrays
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid configuration value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Malformed graph observation
    InvalidGraph(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for PhalanxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhalanxError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            PhalanxError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            PhalanxError::InvalidGraph(msg) => write!(f, "Invalid graph: {}", msg),
            PhalanxError::IoError(msg) => write!(f, "IO error: {}", msg),
            PhalanxError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for PhalanxError {}

impl From<std::io::Error> for PhalanxError {
    fn from(err: std::io::Error) -> Self {
        PhalanxError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for PhalanxError {
    fn from(err: bincode::Error) -> Self {
        PhalanxError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for PhalanxError {
    fn from(err: serde_json::Error) -> Self {
        PhalanxError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl PhalanxError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        PhalanxError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        PhalanxError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
