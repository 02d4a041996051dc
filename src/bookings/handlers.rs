// HTTP handlers for booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::bookings::{
    BookingError, BookingResponse, BookingStatus, CancelBookingRequest, CreateBookingRequest,
};
use crate::payments::CheckoutParams;

/// Query parameters for booking lookups
#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    /// The requesting guest (stands in for an auth layer)
    pub guest_id: i32,
    /// Optional status filter for history listings
    pub status: Option<BookingStatus>,
}

/// Response for a created booking: the booking itself plus the
/// gateway-ready payment form the client forwards to the gateway
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    pub payment: CheckoutParams,
}

/// Handler for POST /api/bookings
/// Creates a booking and returns the signed payment checkout parameters
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = CreateBookingResponse),
        (status = 400, description = "Invalid request or coupon"),
        (status = 404, description = "Guest not found"),
        (status = 409, description = "Insufficient stock or coverage mismatch")
    ),
    tag = "bookings"
)]
pub async fn create_booking_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let (booking, allocations) = state.booking_service.create_booking(request).await?;

    let item_name = format!("Room reservation x {} night(s)", booking.nights);
    let payment = state.gateway.checkout_params(&booking, &item_name);

    let response = CreateBookingResponse {
        booking: BookingResponse::from_parts(booking, allocations),
        payment,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/bookings
/// Booking history for a guest, newest first
#[utoipa::path(
    get,
    path = "/api/bookings",
    params(
        ("guest_id" = i32, Query, description = "Requesting guest ID"),
        ("status" = Option<String>, Query, description = "Optional status filter")
    ),
    responses(
        (status = 200, description = "Bookings for the guest", body = Vec<BookingResponse>)
    ),
    tag = "bookings"
)]
pub async fn list_bookings_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Vec<BookingResponse>>, BookingError> {
    let bookings = state
        .booking_service
        .get_guest_bookings(query.guest_id, query.status)
        .await?;

    Ok(Json(bookings))
}

/// Handler for GET /api/bookings/{booking_id}
/// Retrieves one booking with its allocation lines (owner-only)
#[utoipa::path(
    get,
    path = "/api/bookings/{booking_id}",
    params(
        ("booking_id" = i32, Path, description = "Booking ID"),
        ("guest_id" = i32, Query, description = "Requesting guest ID")
    ),
    responses(
        (status = 200, description = "Booking found", body = BookingResponse),
        (status = 403, description = "Booking belongs to another guest"),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings"
)]
pub async fn get_booking_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<i32>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state
        .booking_service
        .get_booking(booking_id, query.guest_id)
        .await?;

    Ok(Json(booking))
}

/// Handler for POST /api/bookings/{booking_id}/cancel
/// Cancels a booking on behalf of its owning guest
#[utoipa::path(
    post,
    path = "/api/bookings/{booking_id}/cancel",
    params(
        ("booking_id" = i32, Path, description = "Booking ID")
    ),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = BookingResponse),
        (status = 403, description = "Booking belongs to another guest"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Already cancelled or complete")
    ),
    tag = "bookings"
)]
pub async fn cancel_booking_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<i32>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state
        .booking_service
        .cancel_booking(booking_id, request.guest_id)
        .await?;

    let allocations = state
        .allocations_repo
        .find_by_booking_id(booking.id)
        .await?;

    Ok(Json(BookingResponse::from_parts(booking, allocations)))
}
