//! Database access for the generation service backend.
//!
//! Startup goes through [`wait_for_database`] (bounded polling until the
//! server accepts connections) and then [`run_migrations`], which creates
//! the schema idempotently.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection};

pub type DbPool = sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database unreachable after {attempts} attempts: {last_error}")]
    Unreachable { attempts: u32, last_error: String },

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// How long to keep polling a database that is still starting up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total connection attempts, at least one.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(2))
    }
}

/// Create a connection pool from parsed connect options.
pub async fn create_pool(options: PgConnectOptions) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Run `SELECT 1` against the pool.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply every pending migration under `migrations/`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Poll the database until it accepts a connection, then build the pool.
///
/// Each attempt opens a single connection and pings it. Between failed
/// attempts the task sleeps for `policy.delay`. After `policy.max_attempts`
/// failures the last error is returned inside [`DbError::Unreachable`].
pub async fn wait_for_database(
    options: &PgConnectOptions,
    policy: &RetryPolicy,
) -> Result<DbPool, DbError> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match probe(options).await {
            Ok(()) => {
                tracing::info!(attempt, "Database is accepting connections");
                return Ok(create_pool(options.clone()).await?);
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "Database not ready",
                );
                last_error = e.to_string();
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(DbError::Unreachable {
        attempts,
        last_error,
    })
}

/// Open one connection, ping it and close it again.
async fn probe(options: &PgConnectOptions) -> Result<(), sqlx::Error> {
    let mut conn = PgConnection::connect_with(options).await?;
    conn.ping().await?;
    conn.close().await
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use assert_matches::assert_matches;

    use super::*;

    fn unreachable_target() -> PgConnectOptions {
        PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("reelsmith")
            .database("reelsmith")
    }

    #[test]
    fn retry_policy_needs_at_least_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn default_policy_waits_a_minute() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(20));
        let started = Instant::now();

        let result = wait_for_database(&unreachable_target(), &policy).await;

        assert_matches!(
            result,
            Err(DbError::Unreachable { attempts: 3, ref last_error }) if !last_error.is_empty()
        );
        // Two pauses between three attempts.
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn single_attempt_does_not_sleep() {
        let policy = RetryPolicy::new(1, Duration::from_secs(30));
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            wait_for_database(&unreachable_target(), &policy),
        )
        .await
        .expect("should fail without waiting for the delay");

        assert_matches!(result, Err(DbError::Unreachable { attempts: 1, .. }));
    }
}
