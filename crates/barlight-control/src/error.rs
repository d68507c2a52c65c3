//! Error types for the DMX output system
use thiserror::Error;

/// DMX output errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Socket resolution, creation or send failed for one universe
    #[error("Transport error on universe {universe}: {message}")]
    TransportError {
        /// Art-Net universe id
        universe: u16,
        /// Failure description
        message: String,
    },

    /// Input frame does not match the configured band count
    #[error("Invalid frame: expected {expected} bands, got {actual}")]
    InvalidFrame {
        /// Configured band count
        expected: usize,
        /// Length of the frame passed in
        actual: usize,
    },
}

impl ControlError {
    pub(crate) fn transport(universe: u16, message: impl Into<String>) -> Self {
        Self::TransportError {
            universe,
            message: message.into(),
        }
    }
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
