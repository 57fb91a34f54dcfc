use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Everything that can go wrong at the public boundary of a `Network`.
///
/// Shape and configuration errors are caller mistakes. They are reported
/// before any state is touched, so a failed call leaves the network exactly
/// as it was.
#[derive(Debug, Error)]
pub enum NetError {
    /// A vector did not have the width the network declares for it.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Settings or architecture outside their documented ranges.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `train` was called without any samples.
    #[error("no training samples provided")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        NetError::InvalidConfiguration(message.into())
    }

    /// Returns an error unless `actual == expected`.
    pub(crate) fn check_width(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(NetError::ShapeMismatch { what, expected, actual })
        }
    }
}
