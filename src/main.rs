mod availability;
mod bookings;
mod config;
mod db;
mod error;
mod holds;
mod scheduler;
#[cfg(test)]
mod tests;
mod venues;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use availability::{AvailabilityService, CheckerPolicy};
use bookings::{BookingService, MockPaymentGateway};
use config::EngineConfig;
use error::ApiError;
use holds::{HoldManager, HoldsRepository};
use scheduler::Scheduler;
use venues::{Venue, VenueRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        list_venues,
        get_venue_by_id,
        bookings::handlers::check_availability_handler,
        bookings::handlers::create_invoice_handler,
        bookings::handlers::payment_callback_handler,
    ),
    components(
        schemas(
            Venue,
            venues::VenueKind,
            venues::TimeSlot,
            venues::MaintenanceWindow,
            venues::Reservation,
            bookings::BookingData,
            bookings::Booking,
            bookings::InvoiceResponse,
            bookings::PaymentCallbackRequest,
            bookings::PaymentOutcome,
            bookings::FinalizeResponse,
            bookings::handlers::AvailabilityReport,
            availability::Conflict,
        )
    ),
    tags(
        (name = "venues", description = "Venue catalog read endpoints"),
        (name = "bookings", description = "Availability checks and checkout"),
        (name = "payments", description = "Payment gateway callback")
    ),
    info(
        title = "Venue Booking API",
        version = "1.0.0",
        description = "Availability, hold and booking engine for venue reservations"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub venues: VenueRepository,
    pub bookings: BookingService,
}

/// Handler for GET /api/venues
/// Lists the venue catalog with current status flags
#[utoipa::path(
    get,
    path = "/api/venues",
    responses(
        (status = 200, description = "List of all venues", body = Vec<Venue>),
        (status = 500, description = "Internal server error")
    ),
    tag = "venues"
)]
async fn list_venues(State(state): State<AppState>) -> Result<Json<Vec<Venue>>, ApiError> {
    tracing::debug!("Fetching all venues");

    let venues = state.venues.list_all().await?;

    tracing::debug!("Retrieved {} venues", venues.len());
    Ok(Json(venues))
}

/// Handler for GET /api/venues/:id
/// Retrieves a specific venue by ID
#[utoipa::path(
    get,
    path = "/api/venues/{id}",
    params(
        ("id" = i32, Path, description = "Venue ID")
    ),
    responses(
        (status = 200, description = "Venue found", body = Venue),
        (status = 404, description = "Venue not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "venues"
)]
async fn get_venue_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Venue>, ApiError> {
    tracing::debug!("Fetching venue with id: {}", id);

    let venue = state.venues.find_by_id(id).await?.ok_or_else(|| {
        tracing::debug!("Venue with id {} not found", id);
        ApiError::NotFound {
            resource: "Venue".to_string(),
            id: id.to_string(),
        }
    })?;

    Ok(Json(venue))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Catalog reads
        .route("/api/venues", get(list_venues))
        .route("/api/venues/:id", get(get_venue_by_id))
        // Checkout flow
        .route(
            "/api/venues/:id/availability",
            get(bookings::handlers::check_availability_handler),
        )
        .route(
            "/api/bookings/invoice",
            post(bookings::handlers::create_invoice_handler),
        )
        .route(
            "/api/payments/callback",
            post(bookings::handlers::payment_callback_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Venue Booking API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let engine_config = EngineConfig::from_env();

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Wire up the engine services
    let venues_repo = VenueRepository::new(db_pool.clone());
    let availability = AvailabilityService::new(
        db_pool.clone(),
        CheckerPolicy {
            allow_overlapping_photoshoots: engine_config.allow_overlapping_photoshoots,
        },
    );
    let hold_manager = HoldManager::new(
        HoldsRepository::new(db_pool.clone()),
        engine_config.hold_ttls.clone(),
    );
    let booking_service = BookingService::new(
        db_pool.clone(),
        venues_repo.clone(),
        availability,
        hold_manager,
        Arc::new(MockPaymentGateway::default()),
    );

    // Start the reconciliation scheduler
    Scheduler::new(db_pool.clone(), engine_config.scheduler.clone()).spawn();

    let state = AppState {
        db: db_pool,
        venues: venues_repo,
        bookings: booking_service,
    };

    // Create the application router
    let app = create_router(state);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Venue Booking API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
