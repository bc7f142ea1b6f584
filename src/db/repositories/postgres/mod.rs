//! Postgres data source implementation using Diesel.
//!
//! One r2d2 pool is built per repository instance and reused for the whole
//! process lifetime; connections are validated on checkout
//! (`test_on_check_out`) so a stale connection is replaced before a query
//! runs on it. Failures map to [`RepositoryError`] and bubble to the
//! orchestrator — there is no retry loop here, the 15-minute refresh cycle
//! is the retry policy.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL`: full connection string (takes precedence)
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`: individual
//!   parts, all required when `DATABASE_URL` is absent (port defaults 5432)
//! - `PG_POOL_MAX`: maximum pool size (default: 10)
//! - `PG_POOL_MIN`: minimum idle connections (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use std::time::Duration;
use tokio::task;

use crate::db::models::RawBatch;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, YardRepository};

mod models;
mod queries;

use models::{LastUpdateRecord, ReferenceRecord, ShippingRecord, YardRecord};

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of idle connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error naming the missing variable when neither
    /// `DATABASE_URL` nor a complete `DB_*` set is present. This is the one
    /// fatal error class: the server refuses to start without credentials.
    pub fn from_env() -> Result<Self, String> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let host =
                    std::env::var("DB_HOST").map_err(|_| "DB_HOST environment variable not set")?;
                let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
                port.parse::<u16>()
                    .map_err(|_| "DB_PORT must be a valid port number")?;
                let user =
                    std::env::var("DB_USER").map_err(|_| "DB_USER environment variable not set")?;
                let password = std::env::var("DB_PASSWORD")
                    .map_err(|_| "DB_PASSWORD environment variable not set")?;
                let name =
                    std::env::var("DB_NAME").map_err(|_| "DB_NAME environment variable not set")?;
                format!("postgres://{user}:{password}@{host}:{port}/{name}")
            }
        };

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed yard data source.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Build the connection pool.
    ///
    /// # Errors
    /// Returns `RepositoryError::ConnectionError` when the pool cannot be
    /// established with the configured minimum of connections.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        Ok(Self { pool })
    }

    /// Run a blocking database operation on a pooled connection.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation),
                )
            })?;
            f(&mut conn).map_err(|e| e.with_operation(operation))
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl YardRepository for PostgresRepository {
    async fn fetch_raw(&self) -> RepositoryResult<RawBatch> {
        self.with_conn("fetch_raw", |conn| {
            let main = sql_query(queries::MAIN_QUERY)
                .load::<YardRecord>(conn)
                .map_err(RepositoryError::from)?;
            let reference = sql_query(queries::REF_QUERY)
                .load::<ReferenceRecord>(conn)
                .map_err(RepositoryError::from)?;
            let shipping = sql_query(queries::SHIPPING_QUERY)
                .load::<ShippingRecord>(conn)
                .map_err(RepositoryError::from)?;

            Ok(RawBatch {
                main: main.into_iter().map(Into::into).collect(),
                reference: reference.into_iter().map(Into::into).collect(),
                shipping: shipping.into_iter().map(Into::into).collect(),
            })
        })
        .await
    }

    async fn fetch_last_update(&self) -> RepositoryResult<Option<NaiveDateTime>> {
        self.with_conn("fetch_last_update", |conn| {
            let row = sql_query(queries::LAST_UPDATE_QUERY)
                .get_result::<LastUpdateRecord>(conn)
                .map_err(RepositoryError::from)?;
            Ok(row.last_update)
        })
        .await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map_err(RepositoryError::from)?;
            Ok(true)
        })
        .await
    }
}
