//! Tenant signup: redeem an invitation token for a new account.

use chrono::Utc;
use leasehold_core::error::LeaseholdError;
use leasehold_core::models::account::{Account, CreateAccount, emails_match, split_full_name};
use leasehold_core::models::invitation::{Invitation, InvitationStatus, UpdateInvitation};
use leasehold_core::models::linking::{LinkErrorCode, LinkWarning};
use leasehold_core::repository::{AccountRepository, InvitationRepository, TenantRepository};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::linker::ProfileLinker;
use crate::password::check_password_policy;
use crate::token::hash_token;

/// Form data submitted from the signup page.
#[derive(Debug, Clone)]
pub struct SignupInput {
    /// Raw token taken from the signup link.
    pub token: String,
    pub password: String,
    /// Full display name; split on the first space.
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub account: Account,
    pub tenant_id: Uuid,
    pub warning: Option<LinkWarning>,
}

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("invitation link is invalid or expired")]
    InvalidOrExpiredLink,

    #[error("email does not match the invitation")]
    EmailMismatch,

    #[error("password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("email is already registered")]
    EmailAlreadyRegistered,

    /// The credential exists but could not be bound to its tenant.
    #[error("account {account_id} created but not linked: {code}")]
    AccountNotLinked { account_id: Uuid, code: LinkErrorCode },

    #[error("signup failed")]
    Failed(#[source] LeaseholdError),
}

impl SignupError {
    /// Message safe to show the person signing up.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidOrExpiredLink => {
                "This invitation link is invalid or has expired. Ask your property manager for a new one."
            }
            Self::EmailMismatch => "Use the email address this invitation was sent to.",
            Self::WeakPassword { .. } => "Choose a longer password.",
            Self::EmailAlreadyRegistered => {
                "An account with this email already exists. Sign in instead."
            }
            Self::AccountNotLinked { .. } => {
                "Your account was created but could not be connected to your tenant record. Please contact support."
            }
            Self::Failed(_) => "Signup failed. Please try again later.",
        }
    }
}

pub struct SignupHandler<T, A, I>
where
    T: TenantRepository,
    A: AccountRepository,
    I: InvitationRepository,
{
    account_repo: A,
    invitation_repo: I,
    linker: ProfileLinker<T, A>,
    min_password_length: usize,
}

impl<T, A, I> SignupHandler<T, A, I>
where
    T: TenantRepository,
    A: AccountRepository + Clone,
    I: InvitationRepository,
{
    pub fn new(tenant_repo: T, account_repo: A, invitation_repo: I, config: &AuthConfig) -> Self {
        let linker = ProfileLinker::new(tenant_repo, account_repo.clone());
        Self {
            account_repo,
            invitation_repo,
            linker,
            min_password_length: config.min_password_length,
        }
    }
}

impl<T, A, I> SignupHandler<T, A, I>
where
    T: TenantRepository,
    A: AccountRepository,
    I: InvitationRepository,
{
    /// Create a tenant account from an invitation and link it.
    ///
    /// Signup counts as complete only once the link holds. Marking the
    /// invitation accepted afterwards is best effort.
    pub async fn signup(&self, input: SignupInput) -> Result<SignupOutcome, SignupError> {
        let invitation = self.redeemable_invitation(&input.token).await?;

        if !emails_match(&input.email, &invitation.email) {
            warn!(invitation_id = %invitation.id, "Signup email does not match invitation");
            return Err(SignupError::EmailMismatch);
        }

        check_password_policy(&input.password, self.min_password_length).map_err(|e| match e {
            AuthError::WeakPassword { min_length } => SignupError::WeakPassword { min_length },
            other => SignupError::Failed(other.into()),
        })?;

        let (first_name, last_name) = split_full_name(&input.name);
        let account = self
            .account_repo
            .create(CreateAccount {
                email: invitation.email.clone(),
                password: input.password,
                first_name,
                last_name,
                is_tenant_user: true,
                metadata: None,
            })
            .await
            .map_err(|e| match e {
                LeaseholdError::AlreadyExists { .. } => SignupError::EmailAlreadyRegistered,
                other => {
                    error!(invitation_id = %invitation.id, error = %other, "Account creation failed");
                    SignupError::Failed(other)
                }
            })?;
        info!(account_id = %account.id, invitation_id = %invitation.id, "Tenant account created");

        let result = self.linker.link(invitation.tenant_id, account.id).await;
        if let Some(code) = result.error_code {
            error!(
                account_id = %account.id,
                tenant_id = %invitation.tenant_id,
                %code,
                "Tenant account created but not linked"
            );
            return Err(SignupError::AccountNotLinked {
                account_id: account.id,
                code,
            });
        }

        self.mark_accepted(&invitation).await;

        Ok(SignupOutcome {
            account,
            tenant_id: invitation.tenant_id,
            warning: result.warning,
        })
    }

    async fn redeemable_invitation(&self, raw_token: &str) -> Result<Invitation, SignupError> {
        let found = self
            .invitation_repo
            .find_by_token_hash(&hash_token(raw_token))
            .await
            .map_err(|e| {
                error!(error = %e, "Invitation lookup failed");
                SignupError::Failed(e)
            })?;

        match found {
            Some(invitation) if invitation.is_redeemable_at(Utc::now()) => Ok(invitation),
            Some(invitation) => {
                info!(
                    invitation_id = %invitation.id,
                    status = %invitation.status,
                    "Signup with unredeemable invitation"
                );
                Err(SignupError::InvalidOrExpiredLink)
            }
            None => Err(SignupError::InvalidOrExpiredLink),
        }
    }

    async fn mark_accepted(&self, invitation: &Invitation) {
        let update = UpdateInvitation {
            status: Some(InvitationStatus::Accepted),
            accepted_at: Some(Utc::now()),
            ..Default::default()
        };
        match self.invitation_repo.update(invitation.id, update).await {
            Ok(_) => info!(invitation_id = %invitation.id, "Invitation accepted"),
            Err(e) => warn!(
                invitation_id = %invitation.id,
                error = %e,
                "Tenant linked but invitation status not updated"
            ),
        }
    }
}
