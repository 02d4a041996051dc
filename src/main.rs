mod bookings;
mod coupons;
mod db;
mod events;
mod inventory;
mod payments;
mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bookings::{
    AllocationsRepository, BookingService, BookingsRepository, GuestRepository,
};
use coupons::CouponRepository;
use events::TracingObserver;
use inventory::InventoryRepository;
use payments::{GatewayConfig, PaymentGateway};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        bookings::handlers::create_booking_handler,
        bookings::handlers::list_bookings_handler,
        bookings::handlers::get_booking_handler,
        bookings::handlers::cancel_booking_handler,
        inventory::handlers::room_availability_handler,
        payments::handlers::payment_webhook_handler,
    ),
    components(
        schemas(
            bookings::Booking,
            bookings::BookingStatus,
            bookings::AllocationLine,
            bookings::RoomSelection,
            bookings::CreateBookingRequest,
            bookings::CancelBookingRequest,
            bookings::BookingResponse,
            bookings::CreateBookingResponse,
            payments::CheckoutParams,
            inventory::InventoryRecord,
        )
    ),
    tags(
        (name = "bookings", description = "Booking creation and lifecycle endpoints"),
        (name = "inventory", description = "Room availability lookups"),
        (name = "payments", description = "Payment gateway webhook")
    ),
    info(
        title = "Stayline Booking API",
        version = "1.0.0",
        description = "Hotel room booking with inventory allocation and payment reconciliation"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub booking_service: BookingService,
    pub allocations_repo: AllocationsRepository,
    pub inventory_repo: InventoryRepository,
    pub gateway: Arc<PaymentGateway>,
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: PgPool, gateway_config: GatewayConfig) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let bookings_repo = BookingsRepository::new(db.clone());
    let allocations_repo = AllocationsRepository::new(db.clone());
    let guest_repo = GuestRepository::new(db.clone());
    let inventory_repo = InventoryRepository::new(db.clone());
    let coupon_repo = CouponRepository::new(db.clone());

    let booking_service = BookingService::new(
        db.clone(),
        bookings_repo,
        allocations_repo.clone(),
        guest_repo,
        inventory_repo.clone(),
        coupon_repo,
        Arc::new(TracingObserver),
    );

    let state = AppState {
        db,
        booking_service,
        allocations_repo,
        inventory_repo,
        gateway: Arc::new(PaymentGateway::new(gateway_config)),
    };

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API routes
        .route("/api/bookings", post(bookings::create_booking_handler))
        .route("/api/bookings", get(bookings::list_bookings_handler))
        .route("/api/bookings/:booking_id", get(bookings::get_booking_handler))
        .route(
            "/api/bookings/:booking_id/cancel",
            post(bookings::cancel_booking_handler),
        )
        .route(
            "/api/rooms/:room_id/availability",
            get(inventory::room_availability_handler),
        )
        .route(
            "/api/payments/webhook",
            post(payments::payment_webhook_handler),
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

    tracing::info!("Stayline Booking API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

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

    let gateway_config = GatewayConfig::from_env();

    // Create the application router
    let app = create_router(db_pool, gateway_config);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Stayline Booking API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
