use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the connection pool for the drinks database.
///
/// The pool is handed to the store that owns it; nothing here is global.
pub struct DatabaseManager;

impl DatabaseManager {
    const CREATE_DRINKS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS drinks (
            id SERIAL PRIMARY KEY,
            title VARCHAR(80) NOT NULL UNIQUE,
            recipe TEXT NOT NULL
        )
    "#;

    /// Open a pool against `config.url`
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let connection_string = Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!("Created database pool for: {}", Self::redacted(&connection_string));
        Ok(pool)
    }

    /// Create the drinks table when it is missing. Existing rows are kept.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(Self::CREATE_DRINKS_TABLE).execute(pool).await?;
        Ok(())
    }

    /// Drop every drink and restart id assignment
    pub async fn reset(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("DROP TABLE IF EXISTS drinks").execute(pool).await?;
        Self::ensure_schema(pool).await
    }

    fn validate_url(base: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Connection string with the password masked, for logs
    fn redacted(connection_string: &str) -> String {
        match url::Url::parse(connection_string) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
