use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::CONFIG;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<crate::filter::FilterError> for DatabaseError {
    fn from(err: crate::filter::FilterError) -> Self {
        DatabaseError::QueryError(err.to_string())
    }
}

/// The application's single connection pool, opened on first use.
static POOL: OnceCell<PgPool> = OnceCell::const_new();

pub struct DatabaseManager;

impl DatabaseManager {
    /// Pool for the configured DATABASE_URL
    pub async fn main_pool() -> Result<PgPool, DatabaseError> {
        let url = CONFIG
            .database
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        POOL.get_or_try_init(|| Self::connect(url)).await.cloned()
    }

    /// Open a new pool on `connection_string`.
    pub async fn connect(connection_string: &str) -> Result<PgPool, DatabaseError> {
        url::Url::parse(connection_string).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(CONFIG.database.max_connections)
            .acquire_timeout(Duration::from_secs(CONFIG.database.connection_timeout))
            .connect(connection_string)
            .await?;

        info!("Created database pool for: {}", Self::redact(connection_string));
        Ok(pool)
    }

    /// Connection string with any password replaced, for logging
    pub fn redact(connection_string: &str) -> String {
        match url::Url::parse(connection_string) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.into()
            }
            Err(_) => "<invalid database url>".to_string(),
        }
    }

    /// Close the main pool if it was ever opened (e.g., on shutdown)
    pub async fn close() {
        if let Some(pool) = POOL.get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
