//! Payment Attempt Repository
//!
//! Idempotency bookkeeping. A key is claimed *before* the gateway is called;
//! duplicates are answered from the stored row instead of charging again.

use super::RepoResult;
use shared::models::{AttemptStatus, PaymentAttempt};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, idempotency_key, status, transaction_id, order_id, created_at, updated_at";

/// Outcome of claiming an idempotency key
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// Key was free (or its previous attempt failed terminally) - proceed to charge
    Fresh,
    /// Another submission with this key is still charging
    InFlight,
    /// A previous submission with this key already succeeded
    Completed { transaction_id: String, order_id: i64 },
}

/// Claim an idempotency key for a new charge attempt.
pub async fn claim(pool: &SqlitePool, key: &str) -> RepoResult<ClaimOutcome> {
    let now = shared::util::now_millis();

    // Fast path: the key has never been seen
    let inserted = sqlx::query(
        "INSERT INTO payment_attempt (idempotency_key, status, created_at, updated_at) \
         VALUES (?, 'charging', ?, ?) ON CONFLICT(idempotency_key) DO NOTHING",
    )
    .bind(key)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 1 {
        return Ok(ClaimOutcome::Fresh);
    }

    // The key exists - answer from the stored attempt
    let attempt = find_by_key(pool, key).await?;
    match attempt {
        Some(a) if a.status == AttemptStatus::Succeeded => {
            if let (Some(transaction_id), Some(order_id)) = (a.transaction_id, a.order_id) {
                return Ok(ClaimOutcome::Completed {
                    transaction_id,
                    order_id,
                });
            }
            // Succeeded without a stored receipt should not happen; treat as in flight
            Ok(ClaimOutcome::InFlight)
        }
        Some(a) if a.status == AttemptStatus::Failed => {
            // Terminal failure - allow the client to retry under the same key
            let reclaimed = sqlx::query(
                "UPDATE payment_attempt SET status = 'charging', updated_at = ? \
                 WHERE idempotency_key = ? AND status = 'failed'",
            )
            .bind(now)
            .bind(key)
            .execute(pool)
            .await?;
            if reclaimed.rows_affected() == 1 {
                Ok(ClaimOutcome::Fresh)
            } else {
                // Lost the race against a concurrent retry
                Ok(ClaimOutcome::InFlight)
            }
        }
        _ => Ok(ClaimOutcome::InFlight),
    }
}

/// Record a fully successful attempt (charged and persisted)
pub async fn complete(
    pool: &SqlitePool,
    key: &str,
    transaction_id: &str,
    order_id: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE payment_attempt SET status = 'succeeded', transaction_id = ?, order_id = ?, \
         updated_at = ? WHERE idempotency_key = ?",
    )
    .bind(transaction_id)
    .bind(order_id)
    .bind(shared::util::now_millis())
    .bind(key)
    .execute(pool)
    .await?;
    Ok(())
}

/// Record a terminally failed attempt (declined, or no order written)
pub async fn fail(pool: &SqlitePool, key: &str) -> RepoResult<()> {
    sqlx::query(
        "UPDATE payment_attempt SET status = 'failed', updated_at = ? WHERE idempotency_key = ?",
    )
    .bind(shared::util::now_millis())
    .bind(key)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_key(pool: &SqlitePool, key: &str) -> RepoResult<Option<PaymentAttempt>> {
    let attempt = sqlx::query_as::<_, PaymentAttempt>(&format!(
        "SELECT {COLUMNS} FROM payment_attempt WHERE idempotency_key = ?"
    ))
    .bind(key)
    .fetch_optional(pool)
    .await?;
    Ok(attempt)
}
