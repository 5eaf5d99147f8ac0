//! Binary-level error type.

use std::path::PathBuf;

use leasehold_auth::{InvitationError, SignupError};
use leasehold_core::error::LeaseholdError;
use leasehold_core::models::linking::LinkErrorCode;
use leasehold_db::DbError;
use leasehold_mail::DispatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot read key file {}: {source}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("email dispatcher: {0}")]
    Mail(#[from] DispatchError),

    #[error(transparent)]
    Invitation(#[from] InvitationError),

    #[error(transparent)]
    Signup(#[from] SignupError),

    #[error("link failed: {0}")]
    Link(LinkErrorCode),

    #[error(transparent)]
    Core(#[from] LeaseholdError),
}

impl AppError {
    /// The message printed for the operator, without backend detail for
    /// workflow errors.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invitation(e) => e.user_message().to_string(),
            Self::Signup(e) => e.user_message().to_string(),
            Self::Link(code) => format!("{code}: {}", code.user_message()),
            other => other.to_string(),
        }
    }
}
