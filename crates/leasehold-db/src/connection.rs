//! Database start-up: configuration checks, connection and migrations.
//!
//! A [`DbManager`] only exists for a database whose schema is current.
//! Both constructors apply pending migrations before handing it out.

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Where the invitation workflow's data lives.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, `host:port` without a scheme.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "leasehold".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Reject settings that would only fail later, mid-handshake.
    pub fn validate(&self) -> Result<(), DbError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(DbError::Config("database url is empty".into()));
        }
        if url.contains("://") {
            return Err(DbError::Config(format!(
                "database url `{url}` must be host:port without a scheme"
            )));
        }
        for (name, value) in [
            ("namespace", &self.namespace),
            ("database", &self.database),
            ("username", &self.username),
        ] {
            if value.trim().is_empty() {
                return Err(DbError::Config(format!("database {name} is empty")));
            }
        }
        Ok(())
    }
}

/// Handle to a migrated database.
pub struct DbManager<C: Connection = Client> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for DbManager<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl DbManager<Client> {
    /// Validate `config`, connect over WebSocket as root, select the
    /// namespace and database, then migrate.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        config.validate()?;
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Opening leasehold database"
        );

        let db = Surreal::new::<Ws>(config.url.trim()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Self::attach(db).await
    }
}

impl<C: Connection> DbManager<C> {
    /// Take over an already-selected connection and migrate it.
    pub async fn attach(db: Surreal<C>) -> Result<Self, DbError> {
        run_migrations(&db).await?;
        info!("Leasehold schema is current");
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DbConfig::default().validate().is_ok());
    }

    #[test]
    fn url_with_scheme_is_rejected() {
        let config = DbConfig {
            url: "ws://127.0.0.1:8000".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DbError::Config(_))));
    }

    #[test]
    fn blank_namespace_is_rejected() {
        let config = DbConfig {
            namespace: "  ".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("namespace"));
    }
}
