//! Error types for kvframe
//!
//! Provides a unified error type for all codec operations.

use thiserror::Error;

/// Result type alias using FrameError
pub type Result<T> = std::result::Result<T, FrameError>;

/// Unified error type for kvframe operations
#[derive(Debug, Error)]
pub enum FrameError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    /// Magic, version or message kind is not the one this codec speaks.
    #[error(
        "Unsupported protocol: magic={magic:#06x} version={version} message_type={message_type}"
    )]
    UnsupportedProtocol {
        magic: u16,
        version: u8,
        message_type: u8,
    },

    /// Fewer bytes available than a declared length requires.
    #[error("Truncated input: need {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    /// Declared lengths are internally inconsistent.
    #[error("Malformed message: {0}")]
    Malformed(String),

    // -------------------------------------------------------------------------
    // Encode Errors
    // -------------------------------------------------------------------------
    /// A length does not fit the fixed width of its wire field.
    #[error("Overflow on encode: {field} is {value}, wire field holds at most {max}")]
    OverflowOnEncode {
        field: &'static str,
        value: usize,
        max: usize,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FrameError {
    /// Shorthand for a `Truncated` error
    pub(crate) fn truncated(needed: usize, available: usize) -> Self {
        FrameError::Truncated { needed, available }
    }

    /// Returns true if the error means the peer does not speak this protocol
    pub fn is_unsupported(&self) -> bool {
        matches!(self, FrameError::UnsupportedProtocol { .. })
    }
}
