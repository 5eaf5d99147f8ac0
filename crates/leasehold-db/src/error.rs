//! Database-specific error types and conversions.

use leasehold_core::error::LeaseholdError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Invalid database configuration: {0}")]
    Config(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl From<DbError> for LeaseholdError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LeaseholdError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => LeaseholdError::AlreadyExists { entity },
            DbError::Hash(msg) => LeaseholdError::Crypto(msg),
            other => LeaseholdError::Database(other.to_string()),
        }
    }
}

/// Parse a UUID stored as a string column.
pub(crate) fn parse_uuid(raw: &str, column: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {column} UUID: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_its_identity() {
        let err: LeaseholdError = DbError::NotFound {
            entity: "tenant".into(),
            id: "t1".into(),
        }
        .into();
        assert!(err.is_not_found());
    }

    #[test]
    fn query_failures_become_database_errors() {
        let err: LeaseholdError = DbError::Query("boom".into()).into();
        assert!(matches!(err, LeaseholdError::Database(msg) if msg.contains("boom")));
    }

    #[test]
    fn bad_uuid_is_a_decode_error() {
        assert!(matches!(
            parse_uuid("nope", "tenant"),
            Err(DbError::Decode(_))
        ));
    }
}
