//! Configuration error types

/// Errors raised while assembling a [`Config`](crate::Config).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing required setting {0}")]
    Missing(String),

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {var}: {message}")]
    Invalid {
        /// Name of the variable.
        var: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Scheme and domain do not form a valid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
