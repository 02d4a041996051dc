use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;

use crate::inventory::InventoryError;

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Booking not found")]
    NotFound,

    #[error("Guest not found: {0}")]
    GuestNotFound(i32),

    #[error("No inventory on sale for room {room_id} on {day}")]
    RoomNotOnSale { room_id: i32, day: NaiveDate },

    #[error("Insufficient stock for room {room_id} on {day}")]
    InsufficientStock { room_id: i32, day: NaiveDate },

    #[error("Date coverage mismatch: {0}")]
    DateCoverageMismatch(String),

    #[error("Coupon invalid: {0}")]
    CouponInvalid(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Booking is already cancelled")]
    AlreadyCancelled,

    #[error("Booking is already complete")]
    AlreadyComplete,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        BookingError::DatabaseError(err.to_string())
    }
}

impl From<InventoryError> for BookingError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::DatabaseError(msg) => BookingError::DatabaseError(msg),
            InventoryError::RecordNotFound { room_id, day } => {
                BookingError::RoomNotOnSale { room_id, day }
            }
            InventoryError::InsufficientStock { room_id, day } => {
                BookingError::InsufficientStock { room_id, day }
            }
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            BookingError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            BookingError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            BookingError::GuestNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            BookingError::RoomNotOnSale { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            BookingError::InsufficientStock { .. } => (StatusCode::CONFLICT, self.to_string()),
            BookingError::DateCoverageMismatch(_) => (StatusCode::CONFLICT, self.to_string()),
            BookingError::CouponInvalid(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            BookingError::InvalidDateRange(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            BookingError::ValidationError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            BookingError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            BookingError::AlreadyCancelled => (StatusCode::CONFLICT, self.to_string()),
            BookingError::AlreadyComplete => (StatusCode::CONFLICT, self.to_string()),
            BookingError::InvalidTransition(_) => (StatusCode::CONFLICT, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
