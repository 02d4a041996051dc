use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::bookings::error::BookingError;
use crate::bookings::{AllocationLine, Booking, BookingStatus};

/// Repository for guest lookups (guest records are owned by an external
/// collaborator; only existence matters here)
#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    /// Create a new GuestRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check that a guest exists
    pub async fn exists(&self, guest_id: i32) -> Result<bool, BookingError> {
        let exists: Option<bool> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guests WHERE id = $1)")
                .bind(guest_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.unwrap_or(false))
    }
}

/// Column set shared by every booking query
const BOOKING_COLUMNS: &str = "id, guest_id, start_date, end_date, nights, status, subtotal, \
     discount, total_price, coupon_id, guest_name, special_request, trade_no, paid_at, \
     created_at, updated_at";

/// Fields for a booking about to be persisted
#[derive(Debug)]
pub struct NewBooking {
    pub guest_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub nights: i32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
    pub coupon_id: Option<i32>,
    pub guest_name: String,
    pub special_request: Option<String>,
}

/// One allocation row about to be persisted
#[derive(Debug)]
pub struct NewAllocation {
    pub inventory_id: i32,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// Repository for booking operations
#[derive(Clone)]
pub struct BookingsRepository {
    pool: PgPool,
}

impl BookingsRepository {
    /// Create a new BookingsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a booking and its allocations on the caller's transaction.
    /// Nothing becomes visible until the caller commits, which gives the
    /// aggregator its all-or-nothing unit of work.
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: NewBooking,
        allocations: &[NewAllocation],
    ) -> Result<Booking, BookingError> {
        let created = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings
                (guest_id, start_date, end_date, nights, status, subtotal, discount,
                 total_price, coupon_id, guest_name, special_request)
            VALUES ($1, $2, $3, $4, 'unpaid', $5, $6, $7, $8, $9, $10)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.guest_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.nights)
        .bind(booking.subtotal)
        .bind(booking.discount)
        .bind(booking.total_price)
        .bind(booking.coupon_id)
        .bind(&booking.guest_name)
        .bind(&booking.special_request)
        .fetch_one(&mut **tx)
        .await?;

        for allocation in allocations {
            sqlx::query(
                r#"
                INSERT INTO allocations (booking_id, inventory_id, quantity, line_total)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(created.id)
            .bind(allocation.inventory_id)
            .bind(allocation.quantity)
            .bind(allocation.line_total)
            .execute(&mut **tx)
            .await?;
        }

        Ok(created)
    }

    /// Find a booking by ID
    pub async fn find_by_id(&self, booking_id: i32) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// Find a booking and lock its row for the rest of the transaction.
    /// Status transitions are serialized per booking id through this lock.
    pub async fn find_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking_id: i32,
    ) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(booking)
    }

    /// Find bookings by guest with optional status filter, newest first
    pub async fn find_by_guest(
        &self,
        guest_id: i32,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = match status {
            Some(status_filter) => {
                sqlx::query_as::<_, Booking>(&format!(
                    r#"
                    SELECT {BOOKING_COLUMNS}
                    FROM bookings
                    WHERE guest_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(guest_id)
                .bind(status_filter)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Booking>(&format!(
                    r#"
                    SELECT {BOOKING_COLUMNS}
                    FROM bookings
                    WHERE guest_id = $1
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(guest_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(bookings)
    }

    /// Update booking status on the caller's transaction
    pub async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking_id: i32,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(new_status)
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(BookingError::NotFound)?;

        Ok(booking)
    }

    /// Mark a booking paid, recording the gateway trade reference and the
    /// payment timestamp, on the caller's transaction
    pub async fn record_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking_id: i32,
        trade_no: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, trade_no = $2, paid_at = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(BookingStatus::Paid)
        .bind(trade_no)
        .bind(paid_at)
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(BookingError::NotFound)?;

        Ok(booking)
    }
}

/// Repository for allocation line queries
#[derive(Clone)]
pub struct AllocationsRepository {
    pool: PgPool,
}

impl AllocationsRepository {
    /// Create a new AllocationsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All allocation lines for a booking, flattened with the ledger's
    /// room, day and unit price in one query
    pub async fn find_by_booking_id(
        &self,
        booking_id: i32,
    ) -> Result<Vec<AllocationLine>, BookingError> {
        let lines = sqlx::query_as::<_, AllocationLine>(
            r#"
            SELECT a.id, a.booking_id, a.inventory_id, i.room_id, i.day,
                   a.quantity, i.unit_price, a.line_total
            FROM allocations a
            JOIN room_inventory i ON i.id = a.inventory_id
            WHERE a.booking_id = $1
            ORDER BY i.room_id, i.day
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}
