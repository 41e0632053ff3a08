// HTTP handlers for the booking checkout flow

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::availability::{AvailabilityDecision, AvailabilityRequest};
use crate::bookings::{
    BookingData, BookingError, FinalizeResponse, InvoiceRequest, InvoiceResponse,
    PaymentCallbackRequest,
};
use crate::venues::TimeSlot;

/// Query parameters for an availability check
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AvailabilityQuery {
    /// Rooms: stay dates, checkout exclusive
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    /// Halls/lawns/photoshoots: the day being queried
    pub date: Option<NaiveDate>,
    pub slot: Option<TimeSlot>,
    pub start_time: Option<NaiveTime>,
    pub guests: i32,
    /// Requester identity; a hold owned by the same requester is not a conflict
    pub requester: Option<String>,
}

/// Body returned when a venue is free for the requested interval
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AvailabilityReport {
    pub available: bool,
}

/// Handler for GET /api/venues/:id/availability
/// Pure conflict check; a 409 response names the conflicting record
#[utoipa::path(
    get,
    path = "/api/venues/{id}/availability",
    params(
        ("id" = i32, Path, description = "Venue ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Venue is available", body = AvailabilityReport),
        (status = 404, description = "Venue not found"),
        (status = 409, description = "Venue is not available; body names the conflict")
    ),
    tag = "bookings"
)]
pub async fn check_availability_handler(
    State(state): State<crate::AppState>,
    Path(venue_id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityReport>, BookingError> {
    tracing::debug!("Availability check for venue {}", venue_id);

    let venue = state.bookings.find_venue(venue_id).await?;
    let data = InvoiceRequest {
        venue_id,
        check_in: query.check_in,
        check_out: query.check_out,
        date: query.date,
        slot: query.slot,
        start_time: query.start_time,
        guests: query.guests,
        customer_name: "availability-check".to_string(),
        customer_email: query.requester.clone().unwrap_or_default(),
    };
    let interval = data
        .to_interval(venue.kind)
        .map_err(BookingError::ValidationError)?;

    let request = AvailabilityRequest {
        venue_id,
        interval,
        guests: query.guests,
        requester: query.requester.unwrap_or_default(),
    };

    match state.bookings.check_availability(&request).await? {
        AvailabilityDecision::Available => Ok(Json(AvailabilityReport { available: true })),
        AvailabilityDecision::Conflict(conflict) => Err(BookingError::Conflict(conflict)),
    }
}

/// Handler for POST /api/bookings/invoice
/// Verifies availability, places a hold and opens a payment session
#[utoipa::path(
    post,
    path = "/api/bookings/invoice",
    request_body = BookingData,
    responses(
        (status = 201, description = "Invoice opened; venue held until due_at", body = InvoiceResponse),
        (status = 400, description = "Invalid request data"),
        (status = 404, description = "Venue not found"),
        (status = 409, description = "Venue is not available; body names the conflict"),
        (status = 502, description = "Payment gateway failure; the hold has been released")
    ),
    tag = "bookings"
)]
pub async fn create_invoice_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<InvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), BookingError> {
    tracing::debug!(
        "Invoice request for venue {} by {}",
        request.venue_id,
        request.customer_email
    );

    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let invoice = state.bookings.generate_invoice(request).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Handler for POST /api/payments/callback
/// Finalizes a paid booking or compensates a failed payment
#[utoipa::path(
    post,
    path = "/api/payments/callback",
    request_body = PaymentCallbackRequest,
    responses(
        (status = 200, description = "Callback processed", body = FinalizeResponse),
        (status = 404, description = "Venue not found"),
        (status = 409, description = "Availability was lost before finalization; hold released"),
        (status = 503, description = "Transient contention; the gateway should retry")
    ),
    tag = "payments"
)]
pub async fn payment_callback_handler(
    State(state): State<crate::AppState>,
    Json(callback): Json<PaymentCallbackRequest>,
) -> Result<Json<FinalizeResponse>, BookingError> {
    tracing::debug!(
        "Payment callback {} for venue {}",
        callback.reference,
        callback.booking.venue_id
    );

    callback
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    match state.bookings.finalize(callback).await? {
        Some(booking) => Ok(Json(FinalizeResponse {
            status: "confirmed".to_string(),
            booking: Some(booking),
        })),
        None => Ok(Json(FinalizeResponse {
            status: "released".to_string(),
            booking: None,
        })),
    }
}
