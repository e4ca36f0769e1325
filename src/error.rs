//! Error types for the bind-variable layer.

use thiserror::Error;

/// Result type alias for variable operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for bind-variable operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Host value has the wrong shape for the requested operation.
    #[error("Wrong value type: {message}")]
    WrongType { message: String },

    /// Element index outside the allocated capacity.
    #[error("Index {index} out of range for {capacity} allocated elements")]
    IndexOutOfRange { index: u32, capacity: u32 },

    /// Malformed type descriptor or invariant violation detectable from
    /// caller input alone.
    #[error("Programming error: {message}")]
    Programming { message: String },

    /// Operation the native client does not support.
    #[error("Not supported: {message}")]
    NotSupported { message: String },

    /// Failure surfaced by the native client. Carries the native error
    /// code and message unmodified.
    #[error("ORA-{code:05}: {message}")]
    Database { code: u32, message: String },
}

impl Error {
    /// Create a wrong-type error.
    pub fn wrong_type(message: impl Into<String>) -> Self {
        Self::WrongType {
            message: message.into(),
        }
    }

    /// Create a programming error.
    pub fn programming(message: impl Into<String>) -> Self {
        Self::Programming {
            message: message.into(),
        }
    }

    /// Create a not-supported error.
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported {
            message: message.into(),
        }
    }

    /// Create a database error wrapping a native error code and message.
    pub fn database(code: u32, message: impl Into<String>) -> Self {
        Self::Database {
            code,
            message: message.into(),
        }
    }
}
