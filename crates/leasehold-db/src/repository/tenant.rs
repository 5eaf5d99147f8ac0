//! SurrealDB implementation of [`TenantRepository`].
//!
//! Besides the display email, each row stores a lower-cased `email_key`
//! used for case-insensitive lookups.

use chrono::{DateTime, Utc};
use leasehold_core::error::LeaseholdResult;
use leasehold_core::models::tenant::{CreateTenant, Tenant};
use leasehold_core::repository::TenantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct TenantRow {
    owner_id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    tenant_profile_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    owner_id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    tenant_profile_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id,
            owner_id: parse_uuid(&self.owner_id, "owner")?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            tenant_profile_id: self
                .tenant_profile_id
                .as_deref()
                .map(|raw| parse_uuid(raw, "tenant profile"))
                .transpose()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = parse_uuid(&self.record_id, "tenant")?;
        TenantRow {
            owner_id: self.owner_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            tenant_profile_id: self.tenant_profile_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_tenant(id)
    }
}

fn email_key(email: Option<&str>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> LeaseholdResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let key = email_key(input.email.as_deref());

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 owner_id = $owner_id, name = $name, \
                 email = $email, email_key = $email_key, \
                 phone = $phone",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("email_key", key))
            .bind(("phone", input.phone))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> LeaseholdResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn find_by_profile_id(&self, profile_id: Uuid) -> LeaseholdResult<Option<Tenant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE tenant_profile_id = $profile_id LIMIT 1",
            )
            .bind(("profile_id", profile_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(TenantRowWithId::try_into_tenant)
            .transpose()?)
    }

    async fn list_by_email(&self, email: &str) -> LeaseholdResult<Vec<Tenant>> {
        let Some(key) = email_key(Some(email)) else {
            return Ok(Vec::new());
        };

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE email_key = $email_key ORDER BY created_at ASC",
            )
            .bind(("email_key", key))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let tenants = rows
            .into_iter()
            .map(TenantRowWithId::try_into_tenant)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(tenants)
    }

    async fn link_profile(&self, id: Uuid, profile_id: Uuid) -> LeaseholdResult<bool> {
        // Conditional write: a row that is already linked is left alone.
        let result = self
            .db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 tenant_profile_id = $profile_id, updated_at = time::now() \
                 WHERE tenant_profile_id = NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("profile_id", profile_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;
        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn clear_profile(&self, id: Uuid) -> LeaseholdResult<()> {
        self.db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 tenant_profile_id = NONE, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> LeaseholdResult<()> {
        self.db
            .query("DELETE type::record('tenant', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
