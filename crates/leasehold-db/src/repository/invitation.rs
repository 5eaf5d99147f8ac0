//! SurrealDB implementation of [`InvitationRepository`].

use chrono::{DateTime, Utc};
use leasehold_core::error::LeaseholdResult;
use leasehold_core::models::invitation::{
    CreateInvitation, Invitation, InvitationStatus, UpdateInvitation,
};
use leasehold_core::repository::InvitationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct InvitationRow {
    email: String,
    tenant_id: String,
    token_hash: String,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct InvitationRowWithId {
    record_id: String,
    email: String,
    tenant_id: String,
    token_hash: String,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_status(s: &str) -> Result<InvitationStatus, DbError> {
    match s {
        "Pending" => Ok(InvitationStatus::Pending),
        "Accepted" => Ok(InvitationStatus::Accepted),
        "Cancelled" => Ok(InvitationStatus::Cancelled),
        other => Err(DbError::Decode(format!("unknown invitation status: {other}"))),
    }
}

impl InvitationRow {
    fn into_invitation(self, id: Uuid) -> Result<Invitation, DbError> {
        Ok(Invitation {
            id,
            email: self.email,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            token_hash: self.token_hash,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            expires_at: self.expires_at,
            accepted_at: self.accepted_at,
        })
    }
}

impl InvitationRowWithId {
    fn try_into_invitation(self) -> Result<Invitation, DbError> {
        let id = parse_uuid(&self.record_id, "invitation")?;
        InvitationRow {
            email: self.email,
            tenant_id: self.tenant_id,
            token_hash: self.token_hash,
            status: self.status,
            created_at: self.created_at,
            expires_at: self.expires_at,
            accepted_at: self.accepted_at,
        }
        .into_invitation(id)
    }
}

/// SurrealDB implementation of the Invitation repository.
#[derive(Clone)]
pub struct SurrealInvitationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInvitationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn count(&self, query: &str, email: &str, since: DateTime<Utc>) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query(query)
            .bind(("email", email.trim().to_lowercase()))
            .bind(("since", since))
            .await?;

        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

impl<C: Connection> InvitationRepository for SurrealInvitationRepository<C> {
    async fn create(&self, input: CreateInvitation) -> LeaseholdResult<Invitation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('invitation', $id) SET \
                 email = $email, tenant_id = $tenant_id, \
                 token_hash = $token_hash, status = $status, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email.trim().to_lowercase()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("token_hash", input.token_hash))
            .bind(("status", InvitationStatus::Pending.as_str().to_string()))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "invitation".into(),
            id: id_str,
        })?;

        Ok(row.into_invitation(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> LeaseholdResult<Invitation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('invitation', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "invitation".into(),
            id: id_str,
        })?;

        Ok(row.into_invitation(id)?)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> LeaseholdResult<Option<Invitation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM invitation \
                 WHERE token_hash = $token_hash LIMIT 1",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(InvitationRowWithId::try_into_invitation)
            .transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateInvitation) -> LeaseholdResult<Invitation> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.token_hash.is_some() {
            sets.push("token_hash = $token_hash");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.expires_at.is_some() {
            sets.push("expires_at = $expires_at");
        }
        if input.accepted_at.is_some() {
            sets.push("accepted_at = $accepted_at");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('invitation', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email.trim().to_lowercase()));
        }
        if let Some(token_hash) = input.token_hash {
            builder = builder.bind(("token_hash", token_hash));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(expires_at) = input.expires_at {
            builder = builder.bind(("expires_at", expires_at));
        }
        if let Some(accepted_at) = input.accepted_at {
            builder = builder.bind(("accepted_at", accepted_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "invitation".into(),
            id: id_str,
        })?;

        Ok(row.into_invitation(id)?)
    }

    async fn list_pending_for_tenant(&self, tenant_id: Uuid) -> LeaseholdResult<Vec<Invitation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM invitation \
                 WHERE tenant_id = $tenant_id AND status = 'Pending' \
                 ORDER BY created_at DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRowWithId> = result.take(0).map_err(DbError::from)?;
        let invitations = rows
            .into_iter()
            .map(InvitationRowWithId::try_into_invitation)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(invitations)
    }

    async fn exists_created_since(&self, email: &str, since: DateTime<Utc>) -> LeaseholdResult<bool> {
        let total = self
            .count(
                "SELECT count() AS total FROM invitation \
                 WHERE email = $email AND created_at >= $since GROUP ALL",
                email,
                since,
            )
            .await?;
        Ok(total > 0)
    }

    async fn exists_accepted_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> LeaseholdResult<bool> {
        let total = self
            .count(
                "SELECT count() AS total FROM invitation \
                 WHERE email = $email AND status = 'Accepted' \
                 AND accepted_at != NONE AND accepted_at >= $since GROUP ALL",
                email,
                since,
            )
            .await?;
        Ok(total > 0)
    }
}
