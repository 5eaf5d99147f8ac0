//! Authentication service: account registration, login and sign-out.

use chrono::{Duration, Utc};
use leasehold_core::error::{LeaseholdError, LeaseholdResult};
use leasehold_core::models::account::{Account, CreateAccount, split_full_name};
use leasehold_core::models::session::{CreateSession, CurrentSession};
use leasehold_core::repository::{AccountRepository, SessionRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for creating an account credential.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    /// Full display name, split on the first space.
    pub full_name: String,
    pub is_tenant_user: bool,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Raw opaque session token (returned to the client, never stored).
    pub session_token: String,
    /// The established session, handed to post-login checks.
    pub session: CurrentSession,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<A: AccountRepository, S: SessionRepository> {
    account_repo: A,
    session_repo: S,
    config: AuthConfig,
}

impl<A: AccountRepository, S: SessionRepository> AuthService<A, S> {
    pub fn new(account_repo: A, session_repo: S, config: AuthConfig) -> Self {
        Self {
            account_repo,
            session_repo,
            config,
        }
    }

    /// Create a new account credential after checking password policy.
    pub async fn register(&self, input: RegisterInput) -> LeaseholdResult<Account> {
        password::check_password_policy(&input.password, self.config.min_password_length)?;

        let (first_name, last_name) = split_full_name(&input.full_name);
        let account = self
            .account_repo
            .create(CreateAccount {
                email: input.email,
                password: input.password,
                first_name,
                last_name,
                is_tenant_user: input.is_tenant_user,
                metadata: None,
            })
            .await?;

        info!(account_id = %account.id, tenant_user = account.is_tenant_user, "Account registered");
        Ok(account)
    }

    /// Authenticate with email + password, open a session and issue an
    /// access token.
    pub async fn login(&self, input: LoginInput) -> LeaseholdResult<LoginOutput> {
        let account = self
            .account_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = password::verify_password(
            &input.password,
            &account.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let raw_session = token::generate_opaque_token();
        let expires_at = Utc::now() + Duration::seconds(self.config.session_lifetime_secs as i64);

        let session = self
            .session_repo
            .create(CreateSession {
                account_id: account.id,
                token_hash: token::hash_token(&raw_session),
                ip_address: input.ip_address,
                user_agent: input.user_agent,
                expires_at,
            })
            .await?;

        let access_token = token::issue_access_token(&account, session.id, &self.config)?;

        info!(account_id = %account.id, session_id = %session.id, "Login succeeded");

        Ok(LoginOutput {
            access_token,
            session_token: raw_session,
            session: CurrentSession {
                session_id: session.id,
                account_id: account.id,
                email: account.email,
                is_tenant_user: account.is_tenant_user,
                is_admin: account.is_admin,
            },
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Resolve an access token into the caller's session.
    ///
    /// The JWT is verified statelessly, then the backing session row is
    /// checked so that a forced sign-out takes effect immediately.
    pub async fn session_from_token(&self, access_token: &str) -> LeaseholdResult<CurrentSession> {
        let claims = token::decode_access_token(access_token, &self.config)?;
        let account_id = parse_claim_uuid(&claims.sub)?;
        let session_id = parse_claim_uuid(&claims.sid)?;

        let session = match self.session_repo.get_by_id(session_id).await {
            Ok(session) => session,
            Err(LeaseholdError::NotFound { .. }) => return Err(AuthError::SessionRevoked.into()),
            Err(e) => return Err(e),
        };
        if session.account_id != account_id || session.expires_at <= Utc::now() {
            return Err(AuthError::SessionRevoked.into());
        }

        Ok(CurrentSession {
            session_id,
            account_id,
            email: claims.email,
            is_tenant_user: claims.tenant_user,
            is_admin: claims.admin,
        })
    }

    /// End every session of the caller's account.
    pub async fn sign_out(&self, session: &CurrentSession) -> LeaseholdResult<()> {
        self.session_repo
            .invalidate_account_sessions(session.account_id)
            .await?;
        info!(account_id = %session.account_id, "Signed out");
        Ok(())
    }
}

fn parse_claim_uuid(raw: &str) -> Result<Uuid, AuthError> {
    Uuid::parse_str(raw).map_err(|e| AuthError::TokenInvalid(format!("bad id claim: {e}")))
}
