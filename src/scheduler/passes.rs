// Reconciliation passes
//
// Each pass is idempotent and keyed purely on current database state, so a
// run that is skipped or loses a retry race self-heals on the next cycle.

use sqlx::PgPool;

use crate::venues::VenueKind;

/// Clear every hold whose TTL has lapsed
///
/// A single bulk update keyed by the expiry predicate; safe to run
/// concurrently with itself and with request-path acquires, which re-check
/// the same predicate under the row lock.
pub async fn expire_holds(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE venues
        SET on_hold = FALSE, hold_expiry = NULL, hold_by = NULL
        WHERE on_hold = TRUE AND hold_expiry < NOW()
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Derive the out-of-service status for one venue kind from maintenance
/// windows covering today
///
/// Runs both directions (deactivate newly covered venues, reactivate venues
/// with no covering window) inside one transaction per kind so a venue never
/// flaps between intermediate reads. Lawns carry the flag as
/// `is_out_of_service`; every other kind uses `is_active`.
pub async fn derive_statuses(pool: &PgPool, kind: VenueKind) -> Result<(u64, u64), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let (taken_out, restored) = if kind == VenueKind::Lawn {
        let taken_out = sqlx::query(
            r#"
            UPDATE venues
            SET is_out_of_service = TRUE
            WHERE kind = $1 AND is_out_of_service = FALSE AND id IN (
                SELECT venue_id FROM maintenance_windows
                WHERE CURRENT_DATE BETWEEN start_date AND end_date
            )
            "#,
        )
        .bind(kind)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let restored = sqlx::query(
            r#"
            UPDATE venues
            SET is_out_of_service = FALSE
            WHERE kind = $1 AND is_out_of_service = TRUE AND id NOT IN (
                SELECT venue_id FROM maintenance_windows
                WHERE CURRENT_DATE BETWEEN start_date AND end_date
            )
            "#,
        )
        .bind(kind)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        (taken_out, restored)
    } else {
        let taken_out = sqlx::query(
            r#"
            UPDATE venues
            SET is_active = FALSE
            WHERE kind = $1 AND is_active = TRUE AND id IN (
                SELECT venue_id FROM maintenance_windows
                WHERE CURRENT_DATE BETWEEN start_date AND end_date
            )
            "#,
        )
        .bind(kind)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let restored = sqlx::query(
            r#"
            UPDATE venues
            SET is_active = TRUE
            WHERE kind = $1 AND is_active = FALSE AND id NOT IN (
                SELECT venue_id FROM maintenance_windows
                WHERE CURRENT_DATE BETWEEN start_date AND end_date
            )
            "#,
        )
        .bind(kind)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        (taken_out, restored)
    };

    tx.commit().await?;
    Ok((taken_out, restored))
}

/// Recompute the rooms' `is_reserved` flag from admin reservations covering
/// today
///
/// A denormalized read-optimization, never a source of truth: the flag is
/// recomputed wholesale from reservation membership rather than patched
/// incrementally, so it cannot drift.
pub async fn refresh_reserved_flags(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE venues
        SET is_reserved = EXISTS (
            SELECT 1 FROM reservations r
            WHERE r.venue_id = venues.id
              AND r.reserved_from <= CURRENT_DATE
              AND CURRENT_DATE < r.reserved_to
        )
        WHERE kind = $1
        "#,
    )
    .bind(VenueKind::Room)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Permanently delete maintenance windows past the retention horizon
pub async fn purge_expired_windows(pool: &PgPool, retention_days: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM maintenance_windows
        WHERE end_date < CURRENT_DATE - $1::int
        "#,
    )
    .bind(retention_days)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
