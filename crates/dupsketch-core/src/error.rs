//! Error types for dupsketch.

use thiserror::Error;

/// Result type alias for dupsketch operations.
pub type Result<T> = std::result::Result<T, DupsketchError>;

/// Errors that can occur in dupsketch operations.
#[derive(Error, Debug)]
pub enum DupsketchError {
    /// A constructor parameter is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A sketch does not have the length the engine expects.
    #[error("Sketch shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch {
        /// Length the engine was built for.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DupsketchError {
    /// Shorthand for a [`DupsketchError::InvalidConfiguration`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}
