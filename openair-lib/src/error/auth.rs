//! Authentication error types

/// Errors reported through the `Auth` element of a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The API answered with a non-zero auth status.
    #[error("Authentication rejected (status {status:?})")]
    Rejected {
        /// Raw status code; empty when the response carried none.
        status: String,
    },
}

impl AuthError {
    /// Creates a rejection for the given status code.
    pub fn rejected(status: impl Into<String>) -> Self {
        Self::Rejected {
            status: status.into(),
        }
    }

    /// Returns the raw status code reported by the API.
    pub fn status(&self) -> &str {
        match self {
            Self::Rejected { status } => status,
        }
    }
}
