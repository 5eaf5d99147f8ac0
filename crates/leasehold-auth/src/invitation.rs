//! Invitation issuing: create, resend and cancel.
//!
//! The invitation record is written before the email is sent and is never
//! rolled back when delivery fails. Callers get a distinct
//! [`InvitationError::DeliveryFailed`] carrying the persisted invitation
//! and its link, so the owner can resend or share the link by hand.

use chrono::Utc;
use leasehold_core::dispatch::EmailDispatcher;
use leasehold_core::error::LeaseholdError;
use leasehold_core::models::invitation::{
    CreateInvitation, Invitation, InvitationStatus, UpdateInvitation,
};
use leasehold_core::models::linking::{LinkErrorCode, LinkWarning};
use leasehold_core::models::tenant::Tenant;
use leasehold_core::repository::{AccountRepository, InvitationRepository, TenantRepository};
use leasehold_mail::template::{InvitationEmail, signup_link};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::InvitationConfig;
use crate::linker::ProfileLinker;
use crate::token;

/// A persisted invitation together with its raw token and signup link.
///
/// The raw token is not recoverable from storage; this is the only place
/// it exists after issuing.
#[derive(Debug, Clone)]
pub struct IssuedInvitation {
    pub invitation: Invitation,
    pub token: String,
    pub signup_link: Url,
}

#[derive(Debug, Clone)]
pub enum InvitationOutcome {
    /// An invitation was stored and emailed.
    Sent(IssuedInvitation),
    /// An account with the tenant's email already existed and was linked
    /// directly; no invitation was created.
    LinkedExistingAccount {
        account_id: Uuid,
        warning: Option<LinkWarning>,
    },
}

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("tenant not found")]
    TenantNotFound,

    #[error("invitation not found")]
    InvitationNotFound,

    #[error("tenant has no email address")]
    MissingEmail,

    #[error("invitation is {status} and can no longer change")]
    InvalidState { status: InvitationStatus },

    #[error("linking the existing account failed: {0}")]
    LinkFailed(LinkErrorCode),

    #[error("invitation {} stored but the email could not be sent", .0.invitation.id)]
    DeliveryFailed(Box<IssuedInvitation>),

    #[error("invalid signup link configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Storage(#[from] LeaseholdError),
}

impl InvitationError {
    /// Message safe to show the property owner.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::TenantNotFound => "This tenant no longer exists.",
            Self::InvitationNotFound => "This invitation no longer exists.",
            Self::MissingEmail => "Add an email address to the tenant before inviting them.",
            Self::InvalidState { .. } => "This invitation has already been accepted or cancelled.",
            Self::LinkFailed(code) => code.user_message(),
            Self::DeliveryFailed(_) => {
                "The invitation was created, but the email could not be sent. Try resending it."
            }
            Self::Configuration(_) | Self::Storage(_) => {
                "The invitation could not be created. Please try again later."
            }
        }
    }
}

pub struct InvitationIssuer<T, A, I, D>
where
    T: TenantRepository,
    A: AccountRepository,
    I: InvitationRepository,
    D: EmailDispatcher,
{
    tenant_repo: T,
    account_repo: A,
    invitation_repo: I,
    dispatcher: D,
    linker: ProfileLinker<T, A>,
    config: InvitationConfig,
}

impl<T, A, I, D> InvitationIssuer<T, A, I, D>
where
    T: TenantRepository + Clone,
    A: AccountRepository + Clone,
    I: InvitationRepository,
    D: EmailDispatcher,
{
    pub fn new(
        tenant_repo: T,
        account_repo: A,
        invitation_repo: I,
        dispatcher: D,
        config: InvitationConfig,
    ) -> Self {
        let linker = ProfileLinker::new(tenant_repo.clone(), account_repo.clone());
        Self {
            tenant_repo,
            account_repo,
            invitation_repo,
            dispatcher,
            linker,
            config,
        }
    }
}

impl<T, A, I, D> InvitationIssuer<T, A, I, D>
where
    T: TenantRepository,
    A: AccountRepository,
    I: InvitationRepository,
    D: EmailDispatcher,
{
    /// Invite a tenant to the portal.
    ///
    /// If an account already uses the tenant's email it is linked directly
    /// and no invitation is stored. Otherwise a new invitation is stored,
    /// the tenant's older pending invitations are cancelled, and the signup
    /// link is emailed.
    pub async fn create_invitation(
        &self,
        tenant_id: Uuid,
    ) -> Result<InvitationOutcome, InvitationError> {
        let tenant = self.load_tenant(tenant_id).await?;
        let email = tenant
            .contact_email()
            .ok_or(InvitationError::MissingEmail)?
            .to_string();

        if self.config.link_existing_accounts {
            if let Some(account) = self.account_repo.find_by_email(&email).await? {
                warn!(
                    %tenant_id,
                    account_id = %account.id,
                    "Linking tenant to existing account without mailbox verification"
                );
                let result = self.linker.link(tenant_id, account.id).await;
                return match result.error_code {
                    None => Ok(InvitationOutcome::LinkedExistingAccount {
                        account_id: account.id,
                        warning: result.warning,
                    }),
                    Some(code) => Err(InvitationError::LinkFailed(code)),
                };
            }
        }

        let raw_token = token::generate_opaque_token();
        let link = self.build_link(&raw_token)?;

        let invitation = self
            .invitation_repo
            .create(CreateInvitation {
                email,
                tenant_id,
                token_hash: token::hash_token(&raw_token),
                expires_at: Utc::now() + self.config.lifetime(),
            })
            .await?;
        info!(%tenant_id, invitation_id = %invitation.id, "Invitation created");

        self.supersede_pending(tenant_id, invitation.id).await;

        let issued = IssuedInvitation {
            invitation,
            token: raw_token,
            signup_link: link,
        };
        self.deliver(&tenant, issued).await.map(InvitationOutcome::Sent)
    }

    /// Rotate the token, push expiry out again and re-send the email to the
    /// tenant's current address.
    ///
    /// The rotation is kept even when the email fails.
    pub async fn resend_invitation(
        &self,
        invitation_id: Uuid,
    ) -> Result<IssuedInvitation, InvitationError> {
        let invitation = self.load_invitation(invitation_id).await?;
        if !invitation.status.can_transition_to(InvitationStatus::Pending) {
            return Err(InvitationError::InvalidState {
                status: invitation.status,
            });
        }

        let tenant = self.load_tenant(invitation.tenant_id).await?;
        let email = tenant
            .contact_email()
            .ok_or(InvitationError::MissingEmail)?
            .to_string();

        let raw_token = token::generate_opaque_token();
        let link = self.build_link(&raw_token)?;

        let invitation = self
            .invitation_repo
            .update(
                invitation_id,
                UpdateInvitation {
                    email: Some(email),
                    token_hash: Some(token::hash_token(&raw_token)),
                    status: Some(InvitationStatus::Pending),
                    expires_at: Some(Utc::now() + self.config.lifetime()),
                    accepted_at: None,
                },
            )
            .await?;
        info!(%invitation_id, tenant_id = %tenant.id, "Invitation token rotated");

        let issued = IssuedInvitation {
            invitation,
            token: raw_token,
            signup_link: link,
        };
        self.deliver(&tenant, issued).await
    }

    /// Cancel a pending invitation. Cancelling twice is a no-op; an
    /// accepted invitation cannot be cancelled.
    pub async fn cancel_invitation(
        &self,
        invitation_id: Uuid,
    ) -> Result<Invitation, InvitationError> {
        let invitation = self.load_invitation(invitation_id).await?;
        match invitation.status {
            InvitationStatus::Cancelled => Ok(invitation),
            InvitationStatus::Accepted => Err(InvitationError::InvalidState {
                status: invitation.status,
            }),
            InvitationStatus::Pending => {
                let cancelled = self
                    .invitation_repo
                    .update(
                        invitation_id,
                        UpdateInvitation {
                            status: Some(InvitationStatus::Cancelled),
                            ..Default::default()
                        },
                    )
                    .await?;
                info!(%invitation_id, "Invitation cancelled");
                Ok(cancelled)
            }
        }
    }

    /// Cancel every pending invitation of the tenant except `keep`.
    ///
    /// Runs only after the replacement is stored. A failure here leaves an
    /// older invitation pending next to the newer one, so it is logged and
    /// issuing carries on.
    async fn supersede_pending(&self, tenant_id: Uuid, keep: Uuid) {
        let pending = match self.invitation_repo.list_pending_for_tenant(tenant_id).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!(%tenant_id, error = %e, "Could not list invitations to supersede");
                return;
            }
        };

        for stale in pending.into_iter().filter(|inv| inv.id != keep) {
            let cancel = UpdateInvitation {
                status: Some(InvitationStatus::Cancelled),
                ..Default::default()
            };
            match self.invitation_repo.update(stale.id, cancel).await {
                Ok(_) => info!(%tenant_id, invitation_id = %stale.id, "Superseded pending invitation"),
                Err(e) => warn!(
                    %tenant_id,
                    invitation_id = %stale.id,
                    error = %e,
                    "Could not supersede pending invitation"
                ),
            }
        }
    }

    async fn deliver(
        &self,
        tenant: &Tenant,
        issued: IssuedInvitation,
    ) -> Result<IssuedInvitation, InvitationError> {
        let message = InvitationEmail {
            tenant_name: &tenant.name,
            signup_link: &issued.signup_link,
            expires_in_days: self.config.lifetime_days,
        }
        .render(&issued.invitation.email, &self.config.email_subject);

        match self.dispatcher.send(message).await {
            Ok(()) => {
                info!(invitation_id = %issued.invitation.id, "Invitation email sent");
                Ok(issued)
            }
            Err(e) => {
                error!(
                    invitation_id = %issued.invitation.id,
                    error = %e,
                    "Invitation stored but email delivery failed"
                );
                Err(InvitationError::DeliveryFailed(Box::new(issued)))
            }
        }
    }

    fn build_link(&self, raw_token: &str) -> Result<Url, InvitationError> {
        signup_link(
            &self.config.signup_base_url,
            &self.config.signup_path,
            &self.config.token_param,
            raw_token,
        )
        .map_err(|e| InvitationError::Configuration(e.to_string()))
    }

    async fn load_tenant(&self, tenant_id: Uuid) -> Result<Tenant, InvitationError> {
        self.tenant_repo.get_by_id(tenant_id).await.map_err(|e| {
            if e.is_not_found() {
                InvitationError::TenantNotFound
            } else {
                e.into()
            }
        })
    }

    async fn load_invitation(&self, invitation_id: Uuid) -> Result<Invitation, InvitationError> {
        self.invitation_repo
            .get_by_id(invitation_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    InvitationError::InvitationNotFound
                } else {
                    e.into()
                }
            })
    }
}
