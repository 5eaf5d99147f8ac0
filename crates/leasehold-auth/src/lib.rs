//! Leasehold Auth: password authentication, session tokens, and the
//! tenant invitation workflow:
//!
//! - [`InvitationIssuer`] creates, resends and cancels invitations.
//! - [`SignupHandler`] turns an invitation token into an account.
//! - [`ProfileLinker`] binds an account to its tenant record.
//! - [`OrphanGuard`] revokes tenant sessions whose tenant was deleted.

pub mod config;
pub mod error;
pub mod guard;
pub mod invitation;
pub mod linker;
pub mod password;
pub mod service;
pub mod signup;
pub mod token;

pub use config::{AuthConfig, GuardConfig, InvitationConfig};
pub use error::AuthError;
pub use guard::{GuardVerdict, OrphanGuard, Revocation, SkipReason};
pub use invitation::{InvitationError, InvitationIssuer, InvitationOutcome, IssuedInvitation};
pub use linker::ProfileLinker;
pub use service::{AuthService, LoginInput, LoginOutput, RegisterInput};
pub use signup::{SignupError, SignupHandler, SignupInput, SignupOutcome};
pub use token::AccessTokenClaims;
