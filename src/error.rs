//! Error types and handling for libpostal-parser.

/// Result type alias for libpostal operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for libpostal operations.
///
/// Malformed addresses and empty native responses are not errors; they
/// surface as an empty component list (or as a [`crate::ParseOutcome`]
/// variant in the detailed API).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Native setup failed. There is no degraded mode after this.
    #[error("Failed to initialize libpostal: {message}")]
    InitializationFailed {
        /// What went wrong during setup
        message: String,
    },

    /// A thread panicked while holding the engine lock
    #[error("libpostal engine lock poisoned")]
    LockPoisoned,

    /// The process-wide engine was already created
    #[error("The global libpostal engine is already configured")]
    AlreadyConfigured,

    /// Data directory problems
    #[error("Data error: {message}")]
    DataError {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a new initialization error
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new data error
    pub fn data_error(message: impl Into<String>) -> Self {
        Self::DataError {
            message: message.into(),
        }
    }

    /// Whether the engine is unusable for the rest of the process.
    ///
    /// Callers decide what to do with a fatal error: abort, or propagate a
    /// hard failure upward. Continuing to parse is never meaningful.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InitializationFailed { .. } | Self::LockPoisoned)
    }
}
