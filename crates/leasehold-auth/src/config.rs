//! Authentication and workflow configuration.

use chrono::Duration;

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Session lifetime in seconds (default: 2_592_000 = 30 days).
    pub session_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Minimum password length (default: 6).
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            jwt_issuer: "leasehold".into(),
            access_token_lifetime_secs: 900,
            session_lifetime_secs: 2_592_000,
            pepper: None,
            min_password_length: 6,
        }
    }
}

/// Invitation issuing policy.
#[derive(Debug, Clone)]
pub struct InvitationConfig {
    /// How long a freshly issued or resent token stays valid (default: 7).
    pub lifetime_days: i64,
    /// Public base URL of the tenant portal.
    pub signup_base_url: String,
    /// Path of the signup page, joined onto `signup_base_url`.
    pub signup_path: String,
    /// Query parameter carrying the raw token.
    pub token_param: String,
    pub email_subject: String,
    /// Link a tenant straight to an existing account with the same email
    /// instead of sending an invitation (default: true).
    ///
    /// The account's owner never proves control of the mailbox on this
    /// path; disable it to always require the emailed token.
    pub link_existing_accounts: bool,
}

impl InvitationConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::days(self.lifetime_days)
    }
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            lifetime_days: 7,
            signup_base_url: "http://localhost:3000".into(),
            signup_path: "/tenant-signup".into(),
            token_param: "token".into(),
            email_subject: "You're invited to the tenant portal".into(),
            link_existing_accounts: true,
        }
    }
}

/// Timing policy for the orphaned-tenant guard.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Wait before evaluating, so in-flight linking can finish
    /// (default: 3 seconds).
    pub settle_delay: std::time::Duration,
    /// Skip when an invitation for the email was created this recently
    /// (default: 10 minutes).
    pub recent_invitation_grace: Duration,
    /// Skip when the account itself is this new (default: 5 minutes).
    pub new_profile_grace: Duration,
    /// Skip when an invitation for the email was accepted this recently
    /// (default: 30 minutes).
    pub recently_accepted_grace: Duration,
    /// Where a revoked session is sent (default: `/auth`).
    pub sign_in_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            settle_delay: std::time::Duration::from_secs(3),
            recent_invitation_grace: Duration::minutes(10),
            new_profile_grace: Duration::minutes(5),
            recently_accepted_grace: Duration::minutes(30),
            sign_in_path: "/auth".into(),
        }
    }
}
