//! Outcome of a profile-to-tenant link attempt.
//!
//! A [`LinkingResult`] is produced once per attempt and never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkErrorCode {
    TenantNotFound,
    UserNotFound,
    EmailMismatch,
    AlreadyLinkedOtherUser,
    VerificationFailed,
    DatabaseError,
}

impl LinkErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TenantNotFound => "TENANT_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EmailMismatch => "EMAIL_MISMATCH",
            Self::AlreadyLinkedOtherUser => "ALREADY_LINKED_OTHER_USER",
            Self::VerificationFailed => "VERIFICATION_FAILED",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Message safe to show an end user.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::TenantNotFound => "The tenant record for this invitation no longer exists.",
            Self::UserNotFound => "The account could not be found.",
            Self::EmailMismatch => {
                "The account email does not match the email on the tenant record."
            }
            Self::AlreadyLinkedOtherUser => {
                "This tenant is already linked to a different account. Please contact support."
            }
            Self::VerificationFailed => {
                "The account could not be linked to the tenant. Please contact support."
            }
            Self::DatabaseError => "A temporary problem occurred. Please try again later.",
        }
    }

    /// Linkage-integrity failures are never retried; the user is sent to
    /// support instead.
    pub fn requires_support(self) -> bool {
        matches!(self, Self::AlreadyLinkedOtherUser | Self::VerificationFailed)
    }
}

impl fmt::Display for LinkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkWarning {
    AlreadyLinked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkingResult {
    pub success: bool,
    pub message: String,
    pub error_code: Option<LinkErrorCode>,
    pub warning: Option<LinkWarning>,
}

impl LinkingResult {
    pub fn linked() -> Self {
        Self {
            success: true,
            message: "Tenant profile linked.".into(),
            error_code: None,
            warning: None,
        }
    }

    pub fn already_linked() -> Self {
        Self {
            success: true,
            message: "Tenant profile was already linked to this account.".into(),
            error_code: None,
            warning: Some(LinkWarning::AlreadyLinked),
        }
    }

    pub fn failed(code: LinkErrorCode) -> Self {
        Self {
            success: false,
            message: code.user_message().into(),
            error_code: Some(code),
            warning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_in_screaming_case() {
        let json = serde_json::to_string(&LinkErrorCode::AlreadyLinkedOtherUser).unwrap();
        assert_eq!(json, "\"ALREADY_LINKED_OTHER_USER\"");
        assert_eq!(LinkErrorCode::AlreadyLinkedOtherUser.to_string(), "ALREADY_LINKED_OTHER_USER");
    }

    #[test]
    fn failed_result_carries_code_and_safe_message() {
        let result = LinkingResult::failed(LinkErrorCode::DatabaseError);
        assert!(!result.success);
        assert_eq!(result.error_code, Some(LinkErrorCode::DatabaseError));
        assert!(!result.message.to_lowercase().contains("surreal"));
    }

    #[test]
    fn integrity_failures_go_to_support() {
        assert!(LinkErrorCode::AlreadyLinkedOtherUser.requires_support());
        assert!(LinkErrorCode::VerificationFailed.requires_support());
        assert!(!LinkErrorCode::EmailMismatch.requires_support());
    }
}
