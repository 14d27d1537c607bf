//! Error types

mod api;
mod auth;
mod config;
mod field;

pub use api::*;
pub use auth::*;
pub use config::*;
pub use field::*;

/// Top-level error returned by every client operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure or malformed response. Retryable.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The API rejected the session credentials. Never retried.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Invalid or incomplete configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// Every retry attempt failed; `source` is the error of the final attempt.
    #[error("Giving up after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the last attempt.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if a failed request may succeed when sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_retryable(),
            Self::Auth(_) | Self::Config(_) | Self::Cancelled | Self::RetryExhausted { .. } => false,
        }
    }

    /// Returns `true` for an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(self.last_attempt(), Self::Auth(_))
    }

    /// Returns `true` if the operation was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the underlying error of the final attempt.
    ///
    /// For [`Error::RetryExhausted`] this is the wrapped error; any other
    /// error is returned unchanged.
    pub fn last_attempt(&self) -> &Error {
        match self {
            Self::RetryExhausted { source, .. } => source.last_attempt(),
            other => other,
        }
    }
}
