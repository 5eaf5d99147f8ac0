//! Post-login guard for tenant accounts whose tenant record is gone.
//!
//! A tenant-flagged account with no linked tenant is either mid-signup or
//! orphaned by a deleted tenant. The guard tells them apart with grace
//! windows and only revokes on a confirmed absence. Any query failure
//! leaves the session alone.

use chrono::{DateTime, Utc};
use leasehold_core::error::LeaseholdResult;
use leasehold_core::models::account::UpdateAccount;
use leasehold_core::models::session::CurrentSession;
use leasehold_core::repository::{
    AccountRepository, InvitationRepository, PropertyRepository, SessionRepository,
    TenantRepository,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::GuardConfig;

pub const DELETED_ACCOUNT_MESSAGE: &str =
    "Your tenant account has been deleted by your property manager.";

/// Why the guard left a session alone without looking for a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Admin,
    PropertyOwner,
    NotTenantUser,
    RecentInvitation,
    NewProfile,
    RecentlyAccepted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revocation {
    pub account_id: Uuid,
    pub redirect_to: String,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    Skipped(SkipReason),
    /// A tenant is linked to this account.
    Valid { tenant_id: Uuid },
    /// A tenant with this email exists and is not linked yet.
    PendingLink { tenant_id: Uuid },
    /// Tenants with this email exist, all linked elsewhere. Left alone.
    Unresolved,
    /// The tenant is confirmed deleted; sessions were revoked.
    Revoked(Revocation),
    /// A check failed; nothing was changed.
    Inconclusive,
}

impl GuardVerdict {
    pub fn is_revoked(&self) -> bool {
        matches!(self, Self::Revoked(_))
    }
}

pub struct OrphanGuard<A, T, I, P, S>
where
    A: AccountRepository,
    T: TenantRepository,
    I: InvitationRepository,
    P: PropertyRepository,
    S: SessionRepository,
{
    account_repo: A,
    tenant_repo: T,
    invitation_repo: I,
    property_repo: P,
    session_repo: S,
    config: GuardConfig,
}

impl<A, T, I, P, S> OrphanGuard<A, T, I, P, S>
where
    A: AccountRepository,
    T: TenantRepository,
    I: InvitationRepository,
    P: PropertyRepository,
    S: SessionRepository,
{
    pub fn new(
        account_repo: A,
        tenant_repo: T,
        invitation_repo: I,
        property_repo: P,
        session_repo: S,
        config: GuardConfig,
    ) -> Self {
        Self {
            account_repo,
            tenant_repo,
            invitation_repo,
            property_repo,
            session_repo,
            config,
        }
    }

    /// Run once per session establishment. Waits for the settle delay so
    /// in-flight linking can land, then evaluates.
    pub async fn check(&self, session: &CurrentSession) -> GuardVerdict {
        tokio::time::sleep(self.config.settle_delay).await;
        self.evaluate_at(session, Utc::now()).await
    }

    /// Evaluate the session as of `now`, without waiting.
    pub async fn evaluate_at(&self, session: &CurrentSession, now: DateTime<Utc>) -> GuardVerdict {
        match self.evaluate(session, now).await {
            Ok(verdict) => {
                debug!(account_id = %session.account_id, ?verdict, "Tenant guard evaluated");
                verdict
            }
            Err(e) => {
                warn!(account_id = %session.account_id, error = %e, "Tenant guard check failed, leaving session");
                GuardVerdict::Inconclusive
            }
        }
    }

    async fn evaluate(
        &self,
        session: &CurrentSession,
        now: DateTime<Utc>,
    ) -> LeaseholdResult<GuardVerdict> {
        let account = self.account_repo.get_by_id(session.account_id).await?;

        if account.is_admin || session.is_admin {
            return Ok(GuardVerdict::Skipped(SkipReason::Admin));
        }
        if self.property_repo.count_by_owner(account.id).await? > 0 {
            return Ok(GuardVerdict::Skipped(SkipReason::PropertyOwner));
        }
        if !account.is_tenant_user {
            return Ok(GuardVerdict::Skipped(SkipReason::NotTenantUser));
        }

        if self
            .invitation_repo
            .exists_created_since(&account.email, now - self.config.recent_invitation_grace)
            .await?
        {
            return Ok(GuardVerdict::Skipped(SkipReason::RecentInvitation));
        }
        if account.created_at > now - self.config.new_profile_grace {
            return Ok(GuardVerdict::Skipped(SkipReason::NewProfile));
        }
        if self
            .invitation_repo
            .exists_accepted_since(&account.email, now - self.config.recently_accepted_grace)
            .await?
        {
            return Ok(GuardVerdict::Skipped(SkipReason::RecentlyAccepted));
        }

        if let Some(tenant) = self.tenant_repo.find_by_profile_id(account.id).await? {
            return Ok(GuardVerdict::Valid {
                tenant_id: tenant.id,
            });
        }

        let same_email = self.tenant_repo.list_by_email(&account.email).await?;
        if let Some(pending) = same_email.iter().find(|t| !t.is_linked()) {
            info!(account_id = %account.id, tenant_id = %pending.id, "Tenant exists but link not complete");
            return Ok(GuardVerdict::PendingLink {
                tenant_id: pending.id,
            });
        }
        if !same_email.is_empty() {
            warn!(
                account_id = %account.id,
                candidates = same_email.len(),
                "Tenants with this email are linked to other accounts"
            );
            return Ok(GuardVerdict::Unresolved);
        }

        self.revoke(account.id).await
    }

    async fn revoke(&self, account_id: Uuid) -> LeaseholdResult<GuardVerdict> {
        // Sessions go first: if clearing the flag fails the next login
        // re-runs the guard and revokes again.
        self.session_repo
            .invalidate_account_sessions(account_id)
            .await?;
        warn!(%account_id, "Tenant record deleted, sessions revoked");

        let clear = UpdateAccount {
            is_tenant_user: Some(false),
            ..Default::default()
        };
        if let Err(e) = self.account_repo.update(account_id, clear).await {
            error!(%account_id, error = %e, "Sessions revoked but tenant flag not cleared");
        }

        Ok(GuardVerdict::Revoked(Revocation {
            account_id,
            redirect_to: self.config.sign_in_path.clone(),
            message: DELETED_ACCOUNT_MESSAGE,
        }))
    }
}
