use thiserror::Error;

/// Failures reported by the identity provider to its callers.
///
/// The router guard never interprets these; they are surfaced to whichever
/// screen started the operation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists")]
    AccountExists,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("weak password")]
    WeakPassword,
    #[error("network error: {0}")]
    Network(String),
}

impl AuthError {
    /// Whether retrying the same request later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
