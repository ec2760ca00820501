//! # Marquee DB
//!
//! Database pool and query helpers for the Marquee API.
//!
//! Every query the API issues goes through [`with_timeout`], so a slow or
//! hung database fails the request with an internal error instead of holding
//! it open indefinitely.
//!
//! # Example
//!
//! ```ignore
//! use marquee_config::DatabaseConfig;
//! use marquee_db::{init_db_pool, with_timeout};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! let count: i64 = with_timeout(
//!     sqlx::query_scalar("SELECT count(*) FROM movies").fetch_one(&pool),
//! )
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use marquee_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Upper bound on a single query.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);
/// Upper bound on establishing the pool at startup.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database query timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Query(#[from] sqlx::Error),
}

impl DbError {
    /// True when the failure is a unique-constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Query(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }

    /// Name of the violated constraint, if the database reported one.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            DbError::Query(sqlx::Error::Database(e)) => e.constraint(),
            _ => None,
        }
    }
}

/// Runs a query future with [`QUERY_TIMEOUT`].
pub async fn with_timeout<F, T>(query: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    with_deadline(QUERY_TIMEOUT, query).await
}

/// Runs a query future with an explicit deadline.
pub async fn with_deadline<F, T>(deadline: Duration, query: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, query).await {
        Ok(result) => result.map_err(DbError::from),
        Err(_) => Err(DbError::Timeout(deadline)),
    }
}

/// Creates the PostgreSQL pool and verifies connectivity.
///
/// # Errors
///
/// Fails if no connection can be established within [`CONNECT_TIMEOUT`].
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.min_idle_conns)
        .idle_timeout(config.max_idle_time)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_open_conns,
        "database connection pool established"
    );
    Ok(pool)
}
