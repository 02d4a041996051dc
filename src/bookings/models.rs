use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::validation::{validate_date_order, validate_guest_name};

/// Booking status enum representing the lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Unpaid,
    Paid,
    Complete,
    Cancelled,
}

impl BookingStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Unpaid => "unpaid",
            BookingStatus::Paid => "paid",
            BookingStatus::Complete => "complete",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "unpaid" => Ok(BookingStatus::Unpaid),
            "paid" => Ok(BookingStatus::Paid),
            "complete" => Ok(BookingStatus::Complete),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }

    /// Paid-equivalent statuses trigger coupon use-count accounting
    /// exactly once per booking
    pub fn is_paid_equivalent(&self) -> bool {
        matches!(self, BookingStatus::Paid | BookingStatus::Complete)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Unpaid
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a booking in the database.
/// Bookings are never deleted; cancellation is a status transition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub guest_id: i32,
    pub start_date: NaiveDate,
    /// Check-out date, exclusive
    pub end_date: NaiveDate,
    pub nights: i32,
    pub status: BookingStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
    pub coupon_id: Option<i32>,
    pub guest_name: String,
    pub special_request: Option<String>,
    pub trade_no: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A committed claim against one inventory ledger row, tied to exactly one
/// booking. Flattened with the ledger's room/day/price so callers get the
/// shape they need in one query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AllocationLine {
    pub id: i32,
    pub booking_id: i32,
    pub inventory_id: i32,
    pub room_id: i32,
    pub day: NaiveDate,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// One room selection line in a booking request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RoomSelection {
    pub room_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request DTO for creating a new booking
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_booking"))]
pub struct CreateBookingRequest {
    pub guest_id: i32,
    pub start_date: NaiveDate,
    /// Check-out date, exclusive
    pub end_date: NaiveDate,
    #[validate]
    #[validate(length(min = 1, message = "Booking must contain at least one room selection"))]
    pub rooms: Vec<RoomSelection>,
    pub coupon_code: Option<String>,
    #[validate(length(min = 1, message = "Lead guest name is required"))]
    pub guest_name: String,
    pub special_request: Option<String>,
}

/// Schema-level validation for booking requests
fn validate_create_booking(request: &CreateBookingRequest) -> Result<(), ValidationError> {
    validate_date_order(request.start_date, request.end_date)?;
    validate_guest_name(&request.guest_name)?;
    Ok(())
}

/// Request DTO for cancelling a booking
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelBookingRequest {
    pub guest_id: i32,
}

/// Response DTO for a booking with its allocation lines
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: i32,
    pub guest_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub nights: i32,
    pub status: BookingStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
    pub coupon_id: Option<i32>,
    pub guest_name: String,
    pub special_request: Option<String>,
    pub trade_no: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub allocations: Vec<AllocationLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn from_parts(booking: Booking, allocations: Vec<AllocationLine>) -> Self {
        Self {
            id: booking.id,
            guest_id: booking.guest_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            nights: booking.nights,
            status: booking.status,
            subtotal: booking.subtotal,
            discount: booking.discount,
            total_price: booking.total_price,
            coupon_id: booking.coupon_id,
            guest_name: booking.guest_name,
            special_request: booking.special_request,
            trade_no: booking.trade_no,
            paid_at: booking.paid_at,
            allocations,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}
