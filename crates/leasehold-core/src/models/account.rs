//! Account credential domain model.
//!
//! An account is an authenticated identity, independent of the role it
//! plays in the property-management domain. A tenant-portal account
//! carries `is_tenant_user = true` and is expected to be referenced by
//! exactly one [`Tenant`](super::tenant::Tenant) via `tenant_profile_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_tenant_user: bool,
    pub is_admin: bool,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_tenant_user: bool,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAccount {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_tenant_user: Option<bool>,
    pub is_admin: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

/// Split a full display name into first and last name.
///
/// Leading and trailing whitespace is dropped, then the name is cut at the
/// first space: everything before it is the first name, everything after
/// it, untouched, the last name. Single-word names yield an empty last
/// name; that is the stored shape, not a parse failure.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Compare two email addresses the way the workflow does everywhere:
/// trimmed and case-insensitive.
pub fn emails_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_space() {
        assert_eq!(
            split_full_name("Jane Ann Doe"),
            ("Jane".to_string(), "Ann Doe".to_string())
        );
    }

    #[test]
    fn single_word_name_has_empty_last_name() {
        assert_eq!(split_full_name("Cher"), ("Cher".to_string(), String::new()));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(
            split_full_name("  Jane Doe "),
            ("Jane".to_string(), "Doe".to_string())
        );
    }

    #[test]
    fn remainder_after_first_space_is_kept_verbatim() {
        assert_eq!(
            split_full_name("Jane  Doe"),
            ("Jane".to_string(), " Doe".to_string())
        );
        assert_eq!(
            split_full_name("Jane\tDoe"),
            ("Jane\tDoe".to_string(), String::new())
        );
    }

    #[test]
    fn email_comparison_ignores_case() {
        assert!(emails_match("A@x.com", "a@x.com"));
        assert!(emails_match(" jane@x.com", "JANE@X.COM "));
        assert!(!emails_match("jane@x.com", "john@x.com"));
    }
}
