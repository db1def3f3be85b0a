//! Connection pool lifecycle and store-call deadlines.
//!
//! The pool is created once at startup, handed to the HTTP server as shared
//! app data, and closed on the way out. Every query in the route handlers
//! goes through [`with_deadline`], so a hung store connection surfaces as a
//! 503 instead of stalling the request indefinitely.

use crate::error::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;

/// Upper bound on any single store call.
pub const STORE_DEADLINE: Duration = Duration::from_secs(5);

/// Builds the Postgres pool with a bounded acquire timeout.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(STORE_DEADLINE)
        .connect(database_url)
        .await
}

/// Runs a store call under [`STORE_DEADLINE`], failing closed as 503 on expiry.
///
/// Errors from the call itself are reclassified through `From<sqlx::Error>`.
pub async fn with_deadline<T, F>(fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    deadline(STORE_DEADLINE, fut).await
}

async fn deadline<T, F>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::ServiceUnavailable(
            "Database call timed out - please try again".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_deadline_expiry_is_service_unavailable() {
        let never = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<i32, sqlx::Error>(1)
        };

        let result = deadline(Duration::from_millis(10), never).await;

        match result {
            Err(AppError::ServiceUnavailable(_)) => {}
            other => panic!("expected ServiceUnavailable, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_deadline_passes_through_success() {
        let result = with_deadline(async { Ok::<i32, sqlx::Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[actix_rt::test]
    async fn test_deadline_reclassifies_store_errors() {
        let result =
            with_deadline(async { Err::<i32, sqlx::Error>(sqlx::Error::RowNotFound) }).await;
        match result {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
