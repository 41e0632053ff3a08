// Interval conflict checker
//
// Pure evaluation over a loaded snapshot, clock injected. Checks run in a
// fixed order so the first (most fundamental) conflict wins and diagnostics
// stay stable: guest bounds -> venue gating -> active hold -> admin
// reservation -> confirmed booking -> kind-specific business rules.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::availability::models::{AvailabilityDecision, AvailabilityRequest, Conflict, RequestedInterval};
use crate::availability::snapshot::AvailabilitySnapshot;
use crate::venues::{MaintenanceWindow, Venue, VenueKind};

/// Photoshoot sessions reserve a derived block of this length
pub const SESSION_HOURS: i64 = 2;

/// Earliest allowed photoshoot session start
pub fn earliest_session_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap()
}

/// Latest allowed photoshoot session start (so the session ends by close)
pub fn latest_session_start() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).unwrap()
}

/// Tunable behavior of the checker
#[derive(Debug, Clone)]
pub struct CheckerPolicy {
    /// Whether two photoshoot bookings may share the same date and time.
    /// The reference behavior is permissive (multiple photographers can
    /// serve overlapping sessions); set false to enforce exclusivity.
    pub allow_overlapping_photoshoots: bool,
}

impl Default for CheckerPolicy {
    fn default() -> Self {
        Self {
            allow_overlapping_photoshoots: true,
        }
    }
}

/// Classic half-open range overlap: `[a_start, a_end)` vs `[b_start, b_end)`
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Half-open time-of-day overlap for photoshoot sessions
pub fn times_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Session end derived from a requested start time
pub fn session_end(start: NaiveTime) -> NaiveTime {
    start + Duration::hours(SESSION_HOURS)
}

/// Evaluate a request against a consistent snapshot
///
/// Pure read over already-fetched state; callers that go on to write must
/// re-run this inside the same transaction that creates the hold or booking,
/// otherwise a time-of-check/time-of-use gap reopens the double-booking race.
pub fn evaluate(
    snapshot: &AvailabilitySnapshot,
    request: &AvailabilityRequest,
    now: DateTime<Utc>,
    policy: &CheckerPolicy,
) -> AvailabilityDecision {
    let venue = &snapshot.venue;

    // 1. Catalog validity: interval shape must match the venue kind, and the
    //    guest count must fall inside the venue's bounds.
    if let Some(conflict) = check_interval_shape(venue, &request.interval) {
        return AvailabilityDecision::Conflict(conflict);
    }
    if request.guests < venue.min_guests || request.guests > venue.max_guests {
        return AvailabilityDecision::Conflict(Conflict::GuestCount {
            min: venue.min_guests,
            max: venue.max_guests,
            requested: request.guests,
        });
    }

    // 2. Venue-level gating: rooms and photoshoots gate on the derived
    //    is_active flag; halls and lawns gate on maintenance-window
    //    membership for the requested date.
    if let Some(conflict) = check_gating(venue, &snapshot.windows, &request.interval, now) {
        return AvailabilityDecision::Conflict(conflict);
    }

    // 3. Active hold by another requester. The expiry is tested here rather
    //    than trusting the sweep, so a stale hold never blocks anyone past
    //    its TTL even if the scheduler is behind.
    if venue.on_hold {
        if let Some(held_until) = venue.hold_expiry {
            let foreign = venue.hold_by.as_deref() != Some(request.requester.as_str());
            if held_until > now && foreign {
                return AvailabilityDecision::Conflict(Conflict::Hold { held_until });
            }
        }
    }

    // 4. Admin reservation overlap.
    for reservation in &snapshot.reservations {
        let dates_clash = match &request.interval {
            RequestedInterval::DateRange { check_in, check_out } => ranges_overlap(
                reservation.reserved_from,
                reservation.reserved_to,
                *check_in,
                *check_out,
            ),
            RequestedInterval::DaySlot { date, .. } | RequestedInterval::TimedSession { date, .. } => {
                reservation.reserved_from <= *date && *date < reservation.reserved_to
            }
        };
        // A slot-less reservation blocks every slot of its dates.
        let slot_clash = match (reservation.time_slot, request.interval.slot()) {
            (None, _) | (_, None) => true,
            (Some(reserved), Some(requested)) => reserved == requested,
        };
        if dates_clash && slot_clash {
            return AvailabilityDecision::Conflict(Conflict::Reservation {
                reservation_id: reservation.id,
                reserved_from: reservation.reserved_from,
                reserved_to: reservation.reserved_to,
                time_slot: reservation.time_slot,
            });
        }
    }

    // 5. Confirmed-booking overlap.
    for booking in &snapshot.bookings {
        let clash = match &request.interval {
            RequestedInterval::DateRange { check_in, check_out } => ranges_overlap(
                booking.booked_from,
                booking.booked_to,
                *check_in,
                *check_out,
            ),
            RequestedInterval::DaySlot { date, slot } => {
                booking.booked_from == *date && booking.time_slot == Some(*slot)
            }
            RequestedInterval::TimedSession { date, start_time } => {
                if policy.allow_overlapping_photoshoots {
                    false
                } else {
                    booking.booked_from == *date
                        && match (booking.start_time, booking.end_time) {
                            (Some(existing_start), Some(existing_end)) => times_overlap(
                                existing_start,
                                existing_end,
                                *start_time,
                                session_end(*start_time),
                            ),
                            _ => false,
                        }
                }
            }
        };
        if clash {
            return AvailabilityDecision::Conflict(Conflict::Booking {
                booking_id: booking.id,
                booked_from: booking.booked_from,
                booked_to: booking.booked_to,
                time_slot: booking.time_slot,
            });
        }
    }

    // 6. Kind-specific business rules.
    if let RequestedInterval::TimedSession { start_time, .. } = &request.interval {
        if *start_time < earliest_session_start() || *start_time > latest_session_start() {
            return AvailabilityDecision::Conflict(Conflict::OutsideServiceHours {
                earliest_start: earliest_session_start(),
                latest_start: latest_session_start(),
            });
        }
    }

    AvailabilityDecision::Available
}

fn check_interval_shape(venue: &Venue, interval: &RequestedInterval) -> Option<Conflict> {
    match (venue.kind, interval) {
        (VenueKind::Room, RequestedInterval::DateRange { check_in, check_out }) => {
            if check_in >= check_out {
                Some(Conflict::InvalidInterval {
                    detail: "Check-out date must be after check-in date".to_string(),
                })
            } else {
                None
            }
        }
        (VenueKind::Hall | VenueKind::Lawn, RequestedInterval::DaySlot { .. }) => None,
        (VenueKind::Photoshoot, RequestedInterval::TimedSession { .. }) => None,
        (kind, _) => Some(Conflict::InvalidInterval {
            detail: format!("Requested interval does not fit a {} booking", kind),
        }),
    }
}

fn check_gating(
    venue: &Venue,
    windows: &[MaintenanceWindow],
    interval: &RequestedInterval,
    now: DateTime<Utc>,
) -> Option<Conflict> {
    match interval {
        RequestedInterval::DateRange { .. } | RequestedInterval::TimedSession { .. } => {
            let gated_off = match venue.kind {
                VenueKind::Lawn => venue.is_out_of_service,
                _ => !venue.is_active,
            };
            if gated_off {
                return Some(Conflict::VenueInactive);
            }
            None
        }
        RequestedInterval::DaySlot { date, .. } => {
            let today = now.date_naive();
            windows
                .iter()
                .find(|w| w.covers(*date))
                .map(|w| Conflict::Maintenance {
                    window_id: w.id,
                    start_date: w.start_date,
                    end_date: w.end_date,
                    description: w.reason.clone(),
                    currently_out: w.covers(today),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::models::{Booking, PaymentStatus};
    use crate::venues::{Reservation, TimeSlot};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 5, 12, 0, 0).unwrap()
    }

    fn lawn() -> Venue {
        Venue {
            id: 1,
            name: "Rose Lawn".to_string(),
            kind: VenueKind::Lawn,
            is_active: true,
            is_out_of_service: false,
            is_reserved: false,
            min_guests: 50,
            max_guests: 200,
            price: dec!(25000),
            on_hold: false,
            hold_expiry: None,
            hold_by: None,
        }
    }

    fn room() -> Venue {
        Venue {
            id: 2,
            name: "Room 101".to_string(),
            kind: VenueKind::Room,
            is_active: true,
            is_out_of_service: false,
            is_reserved: false,
            min_guests: 1,
            max_guests: 4,
            price: dec!(4500),
            on_hold: false,
            hold_expiry: None,
            hold_by: None,
        }
    }

    fn hall() -> Venue {
        Venue {
            id: 3,
            name: "Grand Hall".to_string(),
            kind: VenueKind::Hall,
            is_active: true,
            is_out_of_service: false,
            is_reserved: false,
            min_guests: 20,
            max_guests: 500,
            price: dec!(60000),
            on_hold: false,
            hold_expiry: None,
            hold_by: None,
        }
    }

    fn snapshot(venue: Venue) -> AvailabilitySnapshot {
        AvailabilitySnapshot {
            venue,
            windows: Vec::new(),
            reservations: Vec::new(),
            bookings: Vec::new(),
        }
    }

    fn slot_request(venue_id: i32, d: NaiveDate, slot: TimeSlot, guests: i32, who: &str) -> AvailabilityRequest {
        AvailabilityRequest {
            venue_id,
            interval: RequestedInterval::DaySlot { date: d, slot },
            guests,
            requester: who.to_string(),
        }
    }

    fn slot_booking(venue_id: i32, d: NaiveDate, slot: TimeSlot) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            venue_id,
            booked_from: d,
            booked_to: d,
            time_slot: Some(slot),
            start_time: None,
            end_time: None,
            guests: 100,
            amount: dec!(60000),
            payment_status: PaymentStatus::Paid,
            booked_by: "member-1".to_string(),
            created_at: now(),
        }
    }

    #[test]
    fn lawn_inside_maintenance_window_conflicts() {
        let mut snap = snapshot(lawn());
        snap.windows.push(MaintenanceWindow {
            id: 7,
            venue_id: 1,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 6, 10),
            reason: "irrigation works".to_string(),
        });

        let request = slot_request(1, date(2025, 6, 5), TimeSlot::Evening, 80, "alice");
        match evaluate(&snap, &request, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::Maintenance { window_id, currently_out, .. }) => {
                assert_eq!(window_id, 7);
                // The window covers the fake "today" (2025-06-05).
                assert!(currently_out);
            }
            other => panic!("expected maintenance conflict, got {:?}", other),
        }

        // Outside the window the same request is clear.
        let request = slot_request(1, date(2025, 6, 15), TimeSlot::Evening, 80, "alice");
        assert!(evaluate(&snap, &request, now(), &CheckerPolicy::default()).is_available());
    }

    #[test]
    fn future_maintenance_window_is_scheduled_not_current() {
        let mut snap = snapshot(lawn());
        snap.windows.push(MaintenanceWindow {
            id: 8,
            venue_id: 1,
            start_date: date(2025, 7, 1),
            end_date: date(2025, 7, 3),
            reason: "reseeding".to_string(),
        });

        let request = slot_request(1, date(2025, 7, 2), TimeSlot::Morning, 80, "alice");
        match evaluate(&snap, &request, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::Maintenance { currently_out, .. }) => {
                assert!(!currently_out);
            }
            other => panic!("expected maintenance conflict, got {:?}", other),
        }
    }

    #[test]
    fn guest_count_outside_bounds_conflicts() {
        let snap = snapshot(lawn());
        let request = slot_request(1, date(2025, 6, 15), TimeSlot::Evening, 30, "alice");
        match evaluate(&snap, &request, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::GuestCount { min, max, requested }) => {
                assert_eq!((min, max, requested), (50, 200, 30));
            }
            other => panic!("expected guest-count conflict, got {:?}", other),
        }
    }

    #[test]
    fn foreign_hold_blocks_until_expiry_then_clears() {
        let mut venue = lawn();
        venue.on_hold = true;
        venue.hold_by = Some("alice".to_string());
        venue.hold_expiry = Some(now() + Duration::minutes(3));
        let snap = snapshot(venue);

        // A second requester sees a hold conflict.
        let request = slot_request(1, date(2025, 6, 15), TimeSlot::Evening, 80, "bob");
        match evaluate(&snap, &request, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::Hold { held_until }) => {
                assert_eq!(held_until, now() + Duration::minutes(3));
            }
            other => panic!("expected hold conflict, got {:?}", other),
        }

        // Past the TTL the same stale row no longer blocks, even before the
        // scheduler has swept it.
        let later = now() + Duration::minutes(5);
        assert!(evaluate(&snap, &request, later, &CheckerPolicy::default()).is_available());
    }

    #[test]
    fn own_hold_is_not_a_conflict() {
        let mut venue = lawn();
        venue.on_hold = true;
        venue.hold_by = Some("alice".to_string());
        venue.hold_expiry = Some(now() + Duration::minutes(3));
        let snap = snapshot(venue);

        let request = slot_request(1, date(2025, 6, 15), TimeSlot::Evening, 80, "alice");
        assert!(evaluate(&snap, &request, now(), &CheckerPolicy::default()).is_available());
    }

    #[test]
    fn hall_booking_conflicts_on_same_date_and_slot_only() {
        let mut snap = snapshot(hall());
        snap.bookings.push(slot_booking(3, date(2025, 7, 1), TimeSlot::Night));

        let clash = slot_request(3, date(2025, 7, 1), TimeSlot::Night, 100, "alice");
        match evaluate(&snap, &clash, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::Booking { time_slot, .. }) => {
                assert_eq!(time_slot, Some(TimeSlot::Night));
            }
            other => panic!("expected booking conflict, got {:?}", other),
        }

        // Different slot on the same date is free.
        let morning = slot_request(3, date(2025, 7, 1), TimeSlot::Morning, 100, "alice");
        assert!(evaluate(&snap, &morning, now(), &CheckerPolicy::default()).is_available());
    }

    #[test]
    fn room_range_overlap_uses_half_open_bounds() {
        let mut snap = snapshot(room());
        snap.bookings.push(Booking {
            id: Uuid::new_v4(),
            venue_id: 2,
            booked_from: date(2025, 6, 10),
            booked_to: date(2025, 6, 13),
            time_slot: None,
            start_time: None,
            end_time: None,
            guests: 2,
            amount: dec!(13500),
            payment_status: PaymentStatus::Paid,
            booked_by: "member-2".to_string(),
            created_at: now(),
        });

        let overlapping = AvailabilityRequest {
            venue_id: 2,
            interval: RequestedInterval::DateRange {
                check_in: date(2025, 6, 12),
                check_out: date(2025, 6, 14),
            },
            guests: 2,
            requester: "alice".to_string(),
        };
        assert!(!evaluate(&snap, &overlapping, now(), &CheckerPolicy::default()).is_available());

        // Back-to-back stay starting on the checkout date is allowed.
        let adjacent = AvailabilityRequest {
            venue_id: 2,
            interval: RequestedInterval::DateRange {
                check_in: date(2025, 6, 13),
                check_out: date(2025, 6, 15),
            },
            guests: 2,
            requester: "alice".to_string(),
        };
        assert!(evaluate(&snap, &adjacent, now(), &CheckerPolicy::default()).is_available());
    }

    #[test]
    fn inactive_room_is_gated_off() {
        let mut venue = room();
        venue.is_active = false;
        let snap = snapshot(venue);

        let request = AvailabilityRequest {
            venue_id: 2,
            interval: RequestedInterval::DateRange {
                check_in: date(2025, 6, 20),
                check_out: date(2025, 6, 21),
            },
            guests: 2,
            requester: "alice".to_string(),
        };
        match evaluate(&snap, &request, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::VenueInactive) => {}
            other => panic!("expected inactive conflict, got {:?}", other),
        }
    }

    #[test]
    fn reservation_blocks_matching_slot_and_slotless_blocks_all() {
        let mut snap = snapshot(hall());
        snap.reservations.push(Reservation {
            id: 11,
            venue_id: 3,
            reserved_from: date(2025, 8, 1),
            reserved_to: date(2025, 8, 3),
            time_slot: Some(TimeSlot::Evening),
            reserved_by: "admin".to_string(),
        });

        let evening = slot_request(3, date(2025, 8, 2), TimeSlot::Evening, 100, "alice");
        assert!(!evaluate(&snap, &evening, now(), &CheckerPolicy::default()).is_available());

        let night = slot_request(3, date(2025, 8, 2), TimeSlot::Night, 100, "alice");
        assert!(evaluate(&snap, &night, now(), &CheckerPolicy::default()).is_available());

        // Exclusive upper bound: the reservation does not cover Aug 3.
        let after = slot_request(3, date(2025, 8, 3), TimeSlot::Evening, 100, "alice");
        assert!(evaluate(&snap, &after, now(), &CheckerPolicy::default()).is_available());

        // A slot-less reservation blocks every slot.
        snap.reservations[0].time_slot = None;
        let night = slot_request(3, date(2025, 8, 2), TimeSlot::Night, 100, "alice");
        assert!(!evaluate(&snap, &night, now(), &CheckerPolicy::default()).is_available());
    }

    #[test]
    fn photoshoot_overlap_policy_is_explicit() {
        let mut venue = lawn();
        venue.kind = VenueKind::Photoshoot;
        venue.min_guests = 1;
        venue.max_guests = 20;
        let mut snap = snapshot(venue);
        snap.bookings.push(Booking {
            id: Uuid::new_v4(),
            venue_id: 1,
            booked_from: date(2025, 6, 20),
            booked_to: date(2025, 6, 20),
            time_slot: None,
            start_time: Some(time(10, 0)),
            end_time: Some(time(12, 0)),
            guests: 5,
            amount: dec!(8000),
            payment_status: PaymentStatus::Paid,
            booked_by: "member-3".to_string(),
            created_at: now(),
        });

        let request = AvailabilityRequest {
            venue_id: 1,
            interval: RequestedInterval::TimedSession {
                date: date(2025, 6, 20),
                start_time: time(11, 0),
            },
            guests: 5,
            requester: "alice".to_string(),
        };

        // Permissive default: coexisting sessions are allowed.
        assert!(evaluate(&snap, &request, now(), &CheckerPolicy::default()).is_available());

        // Strict policy rejects the overlap.
        let strict = CheckerPolicy {
            allow_overlapping_photoshoots: false,
        };
        assert!(!evaluate(&snap, &request, now(), &strict).is_available());

        // Non-overlapping session is fine either way.
        let later = AvailabilityRequest {
            venue_id: 1,
            interval: RequestedInterval::TimedSession {
                date: date(2025, 6, 20),
                start_time: time(12, 0),
            },
            guests: 5,
            requester: "alice".to_string(),
        };
        assert!(evaluate(&snap, &later, now(), &strict).is_available());
    }

    #[test]
    fn photoshoot_start_time_bounds_are_enforced() {
        let mut venue = lawn();
        venue.kind = VenueKind::Photoshoot;
        venue.min_guests = 1;
        venue.max_guests = 20;
        let snap = snapshot(venue);

        let too_late = AvailabilityRequest {
            venue_id: 1,
            interval: RequestedInterval::TimedSession {
                date: date(2025, 6, 20),
                start_time: time(21, 0),
            },
            guests: 5,
            requester: "alice".to_string(),
        };
        match evaluate(&snap, &too_late, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::OutsideServiceHours { .. }) => {}
            other => panic!("expected service-hours conflict, got {:?}", other),
        }
    }

    #[test]
    fn interval_shape_must_match_kind() {
        let snap = snapshot(room());
        let request = slot_request(2, date(2025, 6, 15), TimeSlot::Morning, 2, "alice");
        match evaluate(&snap, &request, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::InvalidInterval { .. }) => {}
            other => panic!("expected invalid-interval conflict, got {:?}", other),
        }
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        let snap = snapshot(room());
        let request = AvailabilityRequest {
            venue_id: 2,
            interval: RequestedInterval::DateRange {
                check_in: date(2025, 6, 15),
                check_out: date(2025, 6, 15),
            },
            guests: 2,
            requester: "alice".to_string(),
        };
        match evaluate(&snap, &request, now(), &CheckerPolicy::default()) {
            AvailabilityDecision::Conflict(Conflict::InvalidInterval { .. }) => {}
            other => panic!("expected invalid-interval conflict, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod overlap_properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..2000).prop_map(|offset| {
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset)
        })
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in arb_date(), b in 1i64..30, c in arb_date(), d in 1i64..30) {
            let (a_end, c_end) = (a + Duration::days(b), c + Duration::days(d));
            prop_assert_eq!(
                ranges_overlap(a, a_end, c, c_end),
                ranges_overlap(c, c_end, a, a_end)
            );
        }

        #[test]
        fn touching_ranges_never_overlap(start in arb_date(), len1 in 1i64..30, len2 in 1i64..30) {
            let mid = start + Duration::days(len1);
            let end = mid + Duration::days(len2);
            prop_assert!(!ranges_overlap(start, mid, mid, end));
        }

        #[test]
        fn range_overlaps_itself(start in arb_date(), len in 1i64..30) {
            let end = start + Duration::days(len);
            prop_assert!(ranges_overlap(start, end, start, end));
        }

        #[test]
        fn contained_range_overlaps(start in arb_date(), pad in 1i64..10, len in 1i64..10) {
            let outer_end = start + Duration::days(pad + len + pad);
            let inner_start = start + Duration::days(pad);
            let inner_end = inner_start + Duration::days(len);
            prop_assert!(ranges_overlap(start, outer_end, inner_start, inner_end));
        }
    }
}
