use chrono::{Duration, Utc};

use crate::config::HoldTtls;
use crate::holds::error::HoldError;
use crate::holds::models::Hold;
use crate::holds::repository::HoldsRepository;
use crate::venues::VenueKind;

/// Hold manager: lifecycle of temporary exclusive claims on venues
///
/// Holds bridge the gap between a passed availability check and a confirmed
/// payment. The TTL is long enough to complete a payment redirect and short
/// enough to bound starvation; the reconciliation scheduler is the backstop
/// for holds whose owner crashed without releasing.
#[derive(Clone)]
pub struct HoldManager {
    repo: HoldsRepository,
    ttls: HoldTtls,
}

impl HoldManager {
    /// Create a new HoldManager
    pub fn new(repo: HoldsRepository, ttls: HoldTtls) -> Self {
        Self { repo, ttls }
    }

    /// TTL applied to holds on venues of this kind
    pub fn ttl_for(&self, kind: VenueKind) -> Duration {
        Duration::minutes(self.ttls.minutes_for(kind))
    }

    /// Claim the venue for this requester until now + TTL
    ///
    /// Re-acquisition by the current holder succeeds and refreshes the
    /// expiry, so a retried checkout resumes its own claim instead of
    /// observing a conflict.
    pub async fn acquire(
        &self,
        venue_id: i32,
        kind: VenueKind,
        requester: &str,
    ) -> Result<Hold, HoldError> {
        let expiry = Utc::now() + self.ttl_for(kind);
        let hold = self.repo.acquire(venue_id, requester, expiry).await?;
        tracing::debug!(
            "Hold acquired on venue {} by {} until {}",
            venue_id,
            requester,
            hold.hold_expiry
        );
        Ok(hold)
    }

    /// Voluntarily release this requester's hold
    ///
    /// Also the compensating action after a payment-gateway failure: the
    /// caller that created the hold must clean it up rather than leaving the
    /// venue blocked until the TTL lapses.
    pub async fn release(&self, venue_id: i32, requester: &str) -> Result<(), HoldError> {
        self.repo.release(venue_id, requester).await?;
        tracing::debug!("Hold released on venue {} by {}", venue_id, requester);
        Ok(())
    }

    /// The venue's live hold, if any
    pub async fn find_active(&self, venue_id: i32) -> Result<Option<Hold>, HoldError> {
        self.repo.find_active(venue_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ttl_is_resolved_per_kind() {
        let ttls = HoldTtls {
            room_minutes: 3,
            hall_minutes: 5,
            lawn_minutes: 5,
            photoshoot_minutes: 3,
        };

        assert_eq!(ttls.minutes_for(VenueKind::Room), 3);
        assert_eq!(ttls.minutes_for(VenueKind::Hall), 5);
        assert_eq!(ttls.minutes_for(VenueKind::Lawn), 5);
        assert_eq!(ttls.minutes_for(VenueKind::Photoshoot), 3);
    }

    #[test]
    fn default_ttl_is_three_minutes_for_every_kind() {
        let ttls = HoldTtls::default();
        let now = Utc.with_ymd_and_hms(2025, 6, 5, 12, 0, 0).unwrap();
        for kind in [VenueKind::Room, VenueKind::Hall, VenueKind::Lawn, VenueKind::Photoshoot] {
            let expiry = now + Duration::minutes(ttls.minutes_for(kind));
            assert_eq!(expiry - now, Duration::minutes(3));
        }
    }
}
