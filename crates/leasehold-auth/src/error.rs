//! Authentication error types.

use leasehold_core::error::LeaseholdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("session has been revoked")]
    SessionRevoked,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for LeaseholdError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::WeakPassword { .. } => LeaseholdError::Validation {
                message: err.to_string(),
            },
            AuthError::InvalidCredentials
            | AuthError::SessionRevoked
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => LeaseholdError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => LeaseholdError::Crypto(msg),
        }
    }
}
