//! Invitation domain model.
//!
//! An invitation grants one-time signup rights tied to a tenant and an
//! email address. Only the SHA-256 digest of the token is stored; the raw
//! token travels inside the signup link and nowhere else.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invitation lifecycle.
///
/// `Pending -> Accepted` and `Pending -> Cancelled` are the only moves;
/// both targets are terminal. A resend keeps the record `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Cancelled,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Pending)
                | (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Cancelled)
        )
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub tenant_id: Uuid,
    /// Hex-encoded SHA-256 of the raw token.
    pub token_hash: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// A token is redeemable only while pending and unexpired.
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && self.expires_at > now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    pub email: String,
    pub tenant_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateInvitation {
    pub email: Option<String>,
    pub token_hash: Option<String>,
    pub status: Option<InvitationStatus>,
    pub expires_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(status: InvitationStatus, expires_in: Duration) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            email: "jane@x.com".into(),
            tenant_id: Uuid::new_v4(),
            token_hash: "digest".into(),
            status,
            created_at: now,
            expires_at: now + expires_in,
            accepted_at: None,
        }
    }

    #[test]
    fn terminal_states_do_not_transition() {
        for terminal in [InvitationStatus::Accepted, InvitationStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for next in [
                InvitationStatus::Pending,
                InvitationStatus::Accepted,
                InvitationStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn pending_can_move_anywhere() {
        let pending = InvitationStatus::Pending;
        assert!(pending.can_transition_to(InvitationStatus::Pending));
        assert!(pending.can_transition_to(InvitationStatus::Accepted));
        assert!(pending.can_transition_to(InvitationStatus::Cancelled));
    }

    #[test]
    fn redeemable_requires_pending_and_future_expiry() {
        let now = Utc::now();
        assert!(invitation(InvitationStatus::Pending, Duration::days(7)).is_redeemable_at(now));
        assert!(!invitation(InvitationStatus::Pending, Duration::days(-1)).is_redeemable_at(now));
        assert!(!invitation(InvitationStatus::Cancelled, Duration::days(7)).is_redeemable_at(now));
        assert!(!invitation(InvitationStatus::Accepted, Duration::days(7)).is_redeemable_at(now));
    }
}
