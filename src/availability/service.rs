use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::availability::checker::{self, CheckerPolicy};
use crate::availability::error::AvailabilityError;
use crate::availability::models::{AvailabilityDecision, AvailabilityRequest};
use crate::availability::snapshot::AvailabilitySnapshot;

/// Service wrapping the pure checker with snapshot loading
///
/// The check is a pure read over a consistent snapshot and performs no
/// writes. Callers that go on to acquire a hold or insert a booking must
/// re-run [`AvailabilityService::check_with`] inside the same transaction
/// to close the time-of-check/time-of-use gap.
#[derive(Clone)]
pub struct AvailabilityService {
    pool: PgPool,
    policy: CheckerPolicy,
}

impl AvailabilityService {
    /// Create a new AvailabilityService
    pub fn new(pool: PgPool, policy: CheckerPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn policy(&self) -> &CheckerPolicy {
        &self.policy
    }

    /// Check availability against current state, using the wall clock
    pub async fn check(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityDecision, AvailabilityError> {
        let mut conn = self.pool.acquire().await?;
        Self::check_with(&mut *conn, request, Utc::now(), &self.policy).await
    }

    /// Check availability through a caller-supplied connection
    ///
    /// Used by the booking finalizer to re-validate inside its finalizing
    /// transaction with `&mut *tx`.
    pub async fn check_with(
        conn: &mut PgConnection,
        request: &AvailabilityRequest,
        now: DateTime<Utc>,
        policy: &CheckerPolicy,
    ) -> Result<AvailabilityDecision, AvailabilityError> {
        let snapshot =
            AvailabilitySnapshot::load(conn, request.venue_id, request.interval.first_date())
                .await?
                .ok_or(AvailabilityError::VenueNotFound(request.venue_id))?;

        Ok(checker::evaluate(&snapshot, request, now, policy))
    }
}
