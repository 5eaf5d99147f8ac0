//! Email dispatch error types.

use leasehold_core::error::LeaseholdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid dispatcher configuration: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email function returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<DispatchError> for LeaseholdError {
    fn from(err: DispatchError) -> Self {
        LeaseholdError::EmailDelivery(err.to_string())
    }
}
