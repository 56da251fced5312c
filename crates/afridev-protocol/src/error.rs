//! Error types for the Afridev codec.

use thiserror::Error;

/// Errors that can occur while reading hex fields out of a message.
///
/// Decoders never surface these to their callers: an absent or unreadable
/// field becomes `None` in the decoded record. The error type exists for the
/// low-level helpers in [`crate::hex_codec`] and [`crate::format`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A character that is not a hex digit appeared where digits were required.
    #[error("invalid hex digits: {0:?}")]
    InvalidDigits(String),

    /// The message ends before the requested field.
    #[error("field absent: {length} hex chars at offset {offset}")]
    FieldAbsent {
        /// Hex-character offset of the field.
        offset: usize,
        /// Field width in hex characters.
        length: usize,
    },
}

impl FormatError {
    /// Create an invalid digits error.
    pub fn invalid_digits(text: impl Into<String>) -> Self {
        FormatError::InvalidDigits(text.into())
    }

    /// Create a field absent error.
    pub fn absent(offset: usize, length: usize) -> Self {
        FormatError::FieldAbsent { offset, length }
    }

    /// Whether this error only means "the message was too short".
    pub fn is_absent(&self) -> bool {
        matches!(self, FormatError::FieldAbsent { .. })
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, FormatError>;
