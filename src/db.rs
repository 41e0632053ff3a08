use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::time::Duration;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Whether a database error is a transient write-write conflict worth retrying
///
/// Postgres reports serialization failures as SQLSTATE 40001 and deadlocks as
/// 40P01. Anything else (constraint violations, connection loss) is not
/// retried here.
pub fn is_retryable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some("40001") | Some("40P01")
        ),
        _ => false,
    }
}

/// Run an idempotent transactional operation, retrying transient conflicts
///
/// Retries only [`is_retryable`] failures, with a short linear backoff, up to
/// `max_attempts`. The final error is returned for the caller to log; the
/// scheduler's passes are idempotent, so a cycle that gives up self-heals on
/// the next tick.
pub async fn with_retries<T, F, Fut>(
    op_name: &str,
    max_attempts: u32,
    mut op: F,
) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) && attempt < max_attempts => {
                tracing::warn!(
                    "{}: transient conflict on attempt {}/{}, retrying: {}",
                    op_name,
                    attempt,
                    max_attempts,
                    err
                );
                tokio::time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn non_database_errors_are_not_retryable() {
        // sqlx exposes no constructor for raw database errors, so the
        // SQLSTATE branch is only reachable against a live database; the
        // classifier must at least never retry plain client errors.
        assert!(!is_retryable(&sqlx::Error::RowNotFound));
        assert!(!is_retryable(&sqlx::Error::PoolTimedOut));
    }

    #[tokio::test]
    async fn with_retries_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, _> = with_retries("test", 5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn with_retries_surfaces_non_retryable_errors_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, _> = with_retries("test", 5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(sqlx::Error::RowNotFound) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
