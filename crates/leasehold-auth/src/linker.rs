//! Profile-to-tenant linking.
//!
//! Linking sets `Tenant.tenant_profile_id` to an account id. It is
//! idempotent for the same pair and never overwrites a link to a
//! different account.

use leasehold_core::error::LeaseholdError;
use leasehold_core::models::account::emails_match;
use leasehold_core::models::linking::{LinkErrorCode, LinkingResult};
use leasehold_core::repository::{AccountRepository, TenantRepository};
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct ProfileLinker<T: TenantRepository, A: AccountRepository> {
    tenant_repo: T,
    account_repo: A,
}

impl<T: TenantRepository, A: AccountRepository> ProfileLinker<T, A> {
    pub fn new(tenant_repo: T, account_repo: A) -> Self {
        Self {
            tenant_repo,
            account_repo,
        }
    }

    /// Bind `account_id` to the tenant `tenant_id`.
    ///
    /// Order of checks: tenant exists, account exists, emails match
    /// (case-insensitive), existing link, then a conditional write
    /// followed by a re-read that must show the new link.
    pub async fn link(&self, tenant_id: Uuid, account_id: Uuid) -> LinkingResult {
        let tenant = match self.tenant_repo.get_by_id(tenant_id).await {
            Ok(tenant) => tenant,
            Err(LeaseholdError::NotFound { .. }) => {
                warn!(%tenant_id, %account_id, "Link failed: tenant not found");
                return LinkingResult::failed(LinkErrorCode::TenantNotFound);
            }
            Err(e) => return database_error("load tenant", tenant_id, account_id, &e),
        };

        let account = match self.account_repo.get_by_id(account_id).await {
            Ok(account) => account,
            Err(LeaseholdError::NotFound { .. }) => {
                warn!(%tenant_id, %account_id, "Link failed: account not found");
                return LinkingResult::failed(LinkErrorCode::UserNotFound);
            }
            Err(e) => return database_error("load account", tenant_id, account_id, &e),
        };

        // Holding a token is not proof of identity; the emails must agree.
        let same_email = tenant
            .contact_email()
            .is_some_and(|email| emails_match(email, &account.email));
        if !same_email {
            warn!(%tenant_id, %account_id, "Link failed: email mismatch");
            return LinkingResult::failed(LinkErrorCode::EmailMismatch);
        }

        match tenant.tenant_profile_id {
            Some(linked) if linked == account_id => {
                info!(%tenant_id, %account_id, "Tenant already linked to this account");
                return LinkingResult::already_linked();
            }
            Some(other) => {
                warn!(%tenant_id, %account_id, linked_to = %other, "Link failed: tenant linked to another account");
                return LinkingResult::failed(LinkErrorCode::AlreadyLinkedOtherUser);
            }
            None => {}
        }

        let written = match self.tenant_repo.link_profile(tenant_id, account_id).await {
            Ok(written) => written,
            Err(e) => return database_error("write link", tenant_id, account_id, &e),
        };

        // The store may report success and still not persist the change,
        // so the row is re-read before the link is trusted.
        let reread = match self.tenant_repo.get_by_id(tenant_id).await {
            Ok(tenant) => tenant,
            Err(LeaseholdError::NotFound { .. }) => {
                warn!(%tenant_id, %account_id, "Link failed: tenant vanished during link");
                return LinkingResult::failed(LinkErrorCode::VerificationFailed);
            }
            Err(e) => return database_error("verify link", tenant_id, account_id, &e),
        };

        match reread.tenant_profile_id {
            Some(linked) if linked == account_id => {
                info!(%tenant_id, %account_id, written, "Tenant profile linked");
                LinkingResult::linked()
            }
            Some(other) if !written => {
                warn!(%tenant_id, %account_id, linked_to = %other, "Link lost a race to another account");
                LinkingResult::failed(LinkErrorCode::AlreadyLinkedOtherUser)
            }
            found => {
                error!(%tenant_id, %account_id, ?found, written, "Link verification failed");
                LinkingResult::failed(LinkErrorCode::VerificationFailed)
            }
        }
    }
}

fn database_error(
    step: &str,
    tenant_id: Uuid,
    account_id: Uuid,
    err: &LeaseholdError,
) -> LinkingResult {
    error!(%tenant_id, %account_id, step, error = %err, "Link failed: storage error");
    LinkingResult::failed(LinkErrorCode::DatabaseError)
}
