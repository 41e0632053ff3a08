use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::holds::error::HoldError;
use crate::holds::models::Hold;

/// Repository for hold state on venue rows
///
/// The acquire is a single-row compare-and-swap: the WHERE clause re-checks
/// the hold state under the row lock the UPDATE takes, so two concurrent
/// requesters cannot both observe "no active hold" and both claim it. A
/// naive SELECT-then-UPDATE here would reintroduce the double-booking race
/// this subsystem exists to prevent.
#[derive(Clone)]
pub struct HoldsRepository {
    pool: PgPool,
}

impl HoldsRepository {
    /// Create a new HoldsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomically claim the venue until `expiry`
    ///
    /// Succeeds when the venue has no hold, a lapsed hold, or a hold already
    /// owned by this requester (re-acquire refreshes the expiry). Returns
    /// `AlreadyHeld` when another requester's live hold is in the way.
    pub async fn acquire(
        &self,
        venue_id: i32,
        requester: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Hold, HoldError> {
        // The diagnosis read below races with hold expiry, so the swap gets
        // one retry when the blocking hold lapses between the two statements.
        for _ in 0..2 {
            let claimed = sqlx::query_as::<_, Hold>(
                r#"
                UPDATE venues
                SET on_hold = TRUE, hold_expiry = $2, hold_by = $3
                WHERE id = $1
                  AND (on_hold = FALSE OR hold_expiry <= NOW() OR hold_by = $3)
                RETURNING id AS venue_id, hold_expiry, hold_by
                "#,
            )
            .bind(venue_id)
            .bind(expiry)
            .bind(requester)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(hold) = claimed {
                return Ok(hold);
            }

            // The swap found no eligible row: the venue is missing, or
            // another requester's hold was live when the swap ran.
            let state = sqlx::query_as::<_, (Option<DateTime<Utc>>,)>(
                "SELECT hold_expiry FROM venues WHERE id = $1",
            )
            .bind(venue_id)
            .fetch_optional(&self.pool)
            .await?;

            match state {
                None => return Err(HoldError::VenueNotFound(venue_id)),
                Some((Some(held_until),)) if held_until > Utc::now() => {
                    return Err(HoldError::AlreadyHeld { held_until })
                }
                // The blocker lapsed after the swap ran; take the swap again.
                Some(_) => {}
            }
        }

        // Two consecutive expiry races; report the contention as of now.
        Err(HoldError::AlreadyHeld {
            held_until: Utc::now(),
        })
    }

    /// Release the hold, but only if this requester owns it
    pub async fn release(&self, venue_id: i32, requester: &str) -> Result<(), HoldError> {
        let result = sqlx::query(
            r#"
            UPDATE venues
            SET on_hold = FALSE, hold_expiry = NULL, hold_by = NULL
            WHERE id = $1 AND on_hold = TRUE AND hold_by = $2
            "#,
        )
        .bind(venue_id)
        .bind(requester)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HoldError::NotHeld);
        }

        Ok(())
    }

    /// The venue's hold, if one is live right now
    pub async fn find_active(&self, venue_id: i32) -> Result<Option<Hold>, HoldError> {
        let hold = sqlx::query_as::<_, Hold>(
            r#"
            SELECT id AS venue_id, hold_expiry, hold_by
            FROM venues
            WHERE id = $1 AND on_hold = TRUE AND hold_expiry > NOW()
            "#,
        )
        .bind(venue_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hold)
    }
}

/// Clear a requester's hold inside an existing transaction
///
/// Used by the booking finalizer so the hold release commits atomically with
/// the booking insert.
pub async fn clear_hold_in_tx(
    conn: &mut PgConnection,
    venue_id: i32,
    requester: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE venues
        SET on_hold = FALSE, hold_expiry = NULL, hold_by = NULL
        WHERE id = $1 AND hold_by = $2
        "#,
    )
    .bind(venue_id)
    .bind(requester)
    .execute(conn)
    .await?;

    Ok(())
}
