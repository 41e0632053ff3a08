use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::availability::checker::session_end;
use crate::availability::{
    AvailabilityDecision, AvailabilityError, AvailabilityRequest, AvailabilityService, Conflict,
    RequestedInterval,
};
use crate::bookings::error::BookingError;
use crate::bookings::gateway::{ConsumerInfo, PaymentGateway, PaymentSubmission};
use crate::bookings::models::{
    Booking, BookingData, InvoiceRequest, InvoiceResponse, PaymentCallbackRequest, PaymentOutcome,
};
use crate::bookings::repository::{self, NewBooking};
use crate::db;
use crate::holds::repository::clear_hold_in_tx;
use crate::holds::{HoldError, HoldManager};
use crate::venues::{Venue, VenueRepository};

/// Outcome classification internal to the finalizer's retry loop
enum FinalizeError {
    Conflict(Conflict),
    Availability(AvailabilityError),
    Db(sqlx::Error),
}

/// Service for the booking checkout flow
///
/// Owns the check -> hold -> invoice path and the payment-callback
/// finalizer. The availability check on its own is advisory; the hold
/// acquire is the atomic claim, and the finalizer re-checks inside its own
/// transaction before committing the booking.
#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
    venues: VenueRepository,
    availability: AvailabilityService,
    holds: HoldManager,
    gateway: Arc<dyn PaymentGateway>,
}

impl BookingService {
    /// Create a new BookingService
    pub fn new(
        pool: PgPool,
        venues: VenueRepository,
        availability: AvailabilityService,
        holds: HoldManager,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            pool,
            venues,
            availability,
            holds,
            gateway,
        }
    }

    /// Run a standalone availability check for a venue
    pub async fn check_availability(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityDecision, BookingError> {
        Ok(self.availability.check(request).await?)
    }

    /// Resolve a venue so callers can shape kind-specific requests
    pub async fn find_venue(&self, venue_id: i32) -> Result<Venue, BookingError> {
        self.venues
            .find_by_id(venue_id)
            .await?
            .ok_or(BookingError::VenueNotFound(venue_id))
    }

    /// Start a checkout: verify availability, claim the venue, open a
    /// payment session and return the invoice descriptor
    ///
    /// The hold's expiry doubles as the invoice due time. If the gateway
    /// submission fails after the hold was taken, the hold is released here
    /// as the compensating action; the scheduler remains the backstop if
    /// this process dies before it can.
    pub async fn generate_invoice(
        &self,
        request: InvoiceRequest,
    ) -> Result<InvoiceResponse, BookingError> {
        let venue = self.find_venue(request.venue_id).await?;
        let interval = request
            .to_interval(venue.kind)
            .map_err(BookingError::ValidationError)?;

        let check = AvailabilityRequest {
            venue_id: venue.id,
            interval: interval.clone(),
            guests: request.guests,
            requester: request.customer_email.clone(),
        };
        if let AvailabilityDecision::Conflict(conflict) = self.availability.check(&check).await? {
            return Err(BookingError::Conflict(conflict));
        }

        let hold = self
            .holds
            .acquire(venue.id, venue.kind, &request.customer_email)
            .await?;

        let amount = compute_amount(&venue, &interval);
        let submission = PaymentSubmission {
            payment_type: venue.kind.to_string(),
            amount,
            consumer: ConsumerInfo {
                name: request.customer_name.clone(),
                email: request.customer_email.clone(),
            },
            booking: request.clone(),
        };

        let session = match self.gateway.create_payment(&submission).await {
            Ok(session) => session,
            Err(gateway_err) => {
                if let Err(release_err) =
                    self.holds.release(venue.id, &request.customer_email).await
                {
                    tracing::error!(
                        "Failed to release hold on venue {} after gateway failure: {}",
                        venue.id,
                        release_err
                    );
                }
                return Err(BookingError::GatewayFailure(gateway_err.to_string()));
            }
        };

        tracing::info!(
            "Invoice {} opened for venue {} ({}), due {}",
            session.reference,
            venue.id,
            request.customer_email,
            hold.hold_expiry
        );

        Ok(InvoiceResponse {
            reference: session.reference,
            venue_id: venue.id,
            venue_name: venue.name,
            amount,
            due_at: hold.hold_expiry,
            payment_channels: session.channels,
        })
    }

    /// Consume the gateway callback
    ///
    /// Success: re-validate availability inside the finalizing transaction,
    /// insert the confirmed booking and release the hold atomically. A
    /// transient serialization failure is retried once (a human is waiting),
    /// then surfaced as a try-again error. Failure: release the hold and
    /// leave no booking.
    pub async fn finalize(
        &self,
        callback: PaymentCallbackRequest,
    ) -> Result<Option<Booking>, BookingError> {
        let venue = self.find_venue(callback.booking.venue_id).await?;
        let interval = callback
            .booking
            .to_interval(venue.kind)
            .map_err(BookingError::ValidationError)?;
        let payer = callback.booking.customer_email.clone();

        if callback.outcome == PaymentOutcome::Failed {
            match self.holds.release(venue.id, &payer).await {
                Ok(()) => {
                    tracing::info!(
                        "Payment {} failed; hold on venue {} released",
                        callback.reference,
                        venue.id
                    );
                }
                // The hold may already have lapsed and been swept.
                Err(HoldError::NotHeld) => {}
                Err(err) => return Err(err.into()),
            }
            return Ok(None);
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.try_finalize(&venue, &interval, &callback.booking).await {
                Ok(booking) => {
                    tracing::info!(
                        "Booking {} confirmed on venue {} for {}",
                        booking.id,
                        venue.id,
                        payer
                    );
                    return Ok(Some(booking));
                }
                Err(FinalizeError::Conflict(conflict)) => {
                    // A race slipped through the hold window; compensate and
                    // surface the conflict rather than double-booking.
                    if let Err(release_err) = self.holds.release(venue.id, &payer).await {
                        tracing::debug!(
                            "Hold on venue {} already gone during conflict cleanup: {}",
                            venue.id,
                            release_err
                        );
                    }
                    return Err(BookingError::Conflict(conflict));
                }
                Err(FinalizeError::Availability(err)) => return Err(err.into()),
                Err(FinalizeError::Db(err)) if db::is_retryable(&err) => {
                    if attempts < 2 {
                        tracing::warn!(
                            "Finalize for venue {} hit a transient conflict, retrying once",
                            venue.id
                        );
                        continue;
                    }
                    return Err(BookingError::TryAgain);
                }
                Err(FinalizeError::Db(err)) => return Err(err.into()),
            }
        }
    }

    async fn try_finalize(
        &self,
        venue: &Venue,
        interval: &RequestedInterval,
        data: &BookingData,
    ) -> Result<Booking, FinalizeError> {
        let mut tx = self.pool.begin().await.map_err(FinalizeError::Db)?;

        // Serialize finalizers per venue. Without this lock two concurrent
        // callbacks both re-check before either commits, and the partial
        // unique index only backstops slot venues, not room date ranges.
        sqlx::query("SELECT id FROM venues WHERE id = $1 FOR UPDATE")
            .bind(venue.id)
            .execute(&mut *tx)
            .await
            .map_err(FinalizeError::Db)?;

        let check = AvailabilityRequest {
            venue_id: venue.id,
            interval: interval.clone(),
            guests: data.guests,
            requester: data.customer_email.clone(),
        };
        let decision =
            AvailabilityService::check_with(&mut *tx, &check, Utc::now(), self.availability.policy())
                .await
                .map_err(FinalizeError::Availability)?;
        if let AvailabilityDecision::Conflict(conflict) = decision {
            return Err(FinalizeError::Conflict(conflict));
        }

        let new = build_new_booking(venue, interval, data);
        let booking = repository::insert_booking_in_tx(&mut *tx, &new)
            .await
            .map_err(FinalizeError::Db)?;
        clear_hold_in_tx(&mut *tx, venue.id, &data.customer_email)
            .await
            .map_err(FinalizeError::Db)?;

        tx.commit().await.map_err(FinalizeError::Db)?;
        Ok(booking)
    }
}

/// Price owed for the requested interval
///
/// Rooms charge per night; every other kind charges a flat per-event price.
pub fn compute_amount(venue: &Venue, interval: &RequestedInterval) -> Decimal {
    match interval {
        RequestedInterval::DateRange { check_in, check_out } => {
            let nights = (*check_out - *check_in).num_days().max(1);
            venue.price * Decimal::from(nights)
        }
        RequestedInterval::DaySlot { .. } | RequestedInterval::TimedSession { .. } => venue.price,
    }
}

fn build_new_booking(venue: &Venue, interval: &RequestedInterval, data: &BookingData) -> NewBooking {
    let (booked_from, booked_to, time_slot, start_time, end_time) = match interval {
        RequestedInterval::DateRange { check_in, check_out } => {
            (*check_in, *check_out, None, None, None)
        }
        RequestedInterval::DaySlot { date, slot } => (*date, *date, Some(*slot), None, None),
        RequestedInterval::TimedSession { date, start_time } => (
            *date,
            *date,
            None,
            Some(*start_time),
            Some(session_end(*start_time)),
        ),
    };

    NewBooking {
        venue_id: venue.id,
        booked_from,
        booked_to,
        time_slot,
        start_time,
        end_time,
        guests: data.guests,
        amount: compute_amount(venue, interval),
        booked_by: data.customer_email.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venues::{TimeSlot, VenueKind};
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn venue(kind: VenueKind, price: Decimal) -> Venue {
        Venue {
            id: 1,
            name: "test".to_string(),
            kind,
            is_active: true,
            is_out_of_service: false,
            is_reserved: false,
            min_guests: 1,
            max_guests: 100,
            price,
            on_hold: false,
            hold_expiry: None,
            hold_by: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn room_amount_is_price_per_night() {
        let interval = RequestedInterval::DateRange {
            check_in: date(2025, 6, 10),
            check_out: date(2025, 6, 13),
        };
        assert_eq!(
            compute_amount(&venue(VenueKind::Room, dec!(4500)), &interval),
            dec!(13500)
        );
    }

    #[test]
    fn slot_amount_is_flat() {
        let interval = RequestedInterval::DaySlot {
            date: date(2025, 7, 1),
            slot: TimeSlot::Night,
        };
        assert_eq!(
            compute_amount(&venue(VenueKind::Hall, dec!(60000)), &interval),
            dec!(60000)
        );
    }

    #[test]
    fn photoshoot_booking_derives_two_hour_end() {
        let interval = RequestedInterval::TimedSession {
            date: date(2025, 6, 20),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };
        let data = BookingData {
            venue_id: 1,
            check_in: None,
            check_out: None,
            date: Some(date(2025, 6, 20)),
            slot: None,
            start_time: NaiveTime::from_hms_opt(10, 0, 0),
            guests: 5,
            customer_name: "Alice".to_string(),
            customer_email: "alice@example.com".to_string(),
        };

        let new = build_new_booking(&venue(VenueKind::Photoshoot, dec!(8000)), &interval, &data);
        assert_eq!(new.start_time, NaiveTime::from_hms_opt(10, 0, 0));
        assert_eq!(new.end_time, NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(new.booked_from, new.booked_to);
    }
}
