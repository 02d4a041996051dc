use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::bookings::{
    AllocationsRepository, Booking, BookingError, BookingResponse, BookingStatus,
    BookingsRepository, CreateBookingRequest, GuestRepository, NewAllocation, NewBooking,
    PriceCalculator, StatusMachine,
};
use crate::coupons::CouponRepository;
use crate::events::{StatusChangeEvent, StatusChangeObserver};
use crate::inventory::InventoryRepository;

/// Every night of a stay: the half-open range [start, end)
fn stay_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start;
    while day < end {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

/// Re-check that the dates actually allocated are exactly the requested
/// half-open range, per room line and overall: consecutive calendar days,
/// no gaps, no dates outside the stay.
fn verify_coverage(
    start: NaiveDate,
    end: NaiveDate,
    allocated: &[(i32, Vec<NaiveDate>)],
) -> Result<(), BookingError> {
    let expected = stay_days(start, end);

    if allocated.is_empty() {
        return Err(BookingError::DateCoverageMismatch(
            "booking has no allocations".to_string(),
        ));
    }

    for (room_id, days) in allocated {
        let mut sorted = days.clone();
        sorted.sort();
        sorted.dedup();
        if sorted != expected {
            return Err(BookingError::DateCoverageMismatch(format!(
                "room {} covers {} of {} requested nights",
                room_id,
                sorted.len(),
                expected.len()
            )));
        }
    }

    Ok(())
}

/// Service orchestrating the booking flow: inventory allocation, date
/// coverage, pricing, coupon application, persistence and the payment
/// status lifecycle
#[derive(Clone)]
pub struct BookingService {
    pool: sqlx::PgPool,
    bookings_repo: BookingsRepository,
    allocations_repo: AllocationsRepository,
    guest_repo: GuestRepository,
    inventory_repo: InventoryRepository,
    coupon_repo: CouponRepository,
    observer: Arc<dyn StatusChangeObserver>,
}

impl BookingService {
    /// Create a new BookingService
    pub fn new(
        pool: sqlx::PgPool,
        bookings_repo: BookingsRepository,
        allocations_repo: AllocationsRepository,
        guest_repo: GuestRepository,
        inventory_repo: InventoryRepository,
        coupon_repo: CouponRepository,
        observer: Arc<dyn StatusChangeObserver>,
    ) -> Self {
        Self {
            pool,
            bookings_repo,
            allocations_repo,
            guest_repo,
            inventory_repo,
            coupon_repo,
            observer,
        }
    }

    /// Create a new booking.
    ///
    /// Steps, each a hard precondition for the next, all inside a single
    /// transaction so any failure rolls back every decrement already made:
    /// 1. date range and room line validation, guest existence
    /// 2. atomic conditional decrement per (room line, night)
    /// 3. explicit date coverage re-check over the allocated rows
    /// 4. subtotal from line totals
    /// 5. optional coupon validation; total = max(0, subtotal - discount);
    ///    the use count is NOT incremented here
    /// 6. booking (unpaid) + allocations persisted, commit
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<(Booking, Vec<crate::bookings::AllocationLine>), BookingError> {
        if request.end_date <= request.start_date {
            return Err(BookingError::InvalidDateRange(format!(
                "end date {} must be after start date {}",
                request.end_date, request.start_date
            )));
        }
        if request.rooms.is_empty() {
            return Err(BookingError::ValidationError(
                "Booking must contain at least one room selection".to_string(),
            ));
        }
        for line in &request.rooms {
            if line.quantity <= 0 {
                return Err(BookingError::ValidationError(format!(
                    "Quantity must be positive, got {}",
                    line.quantity
                )));
            }
        }

        if !self.guest_repo.exists(request.guest_id).await? {
            return Err(BookingError::GuestNotFound(request.guest_id));
        }

        let mut tx = self.pool.begin().await?;

        // Allocate night by night; an early return drops the transaction
        // and with it every decrement of this attempt
        let mut allocations: Vec<NewAllocation> = Vec::new();
        let mut line_totals: Vec<Decimal> = Vec::new();
        let mut allocated_days: Vec<(i32, Vec<NaiveDate>)> = Vec::new();

        for line in &request.rooms {
            let mut days = Vec::new();
            for day in stay_days(request.start_date, request.end_date) {
                let record = self
                    .inventory_repo
                    .decrement(&mut tx, line.room_id, day, line.quantity)
                    .await?;

                let line_total = PriceCalculator::line_total(line.quantity, record.unit_price);
                allocations.push(NewAllocation {
                    inventory_id: record.id,
                    quantity: line.quantity,
                    line_total,
                });
                line_totals.push(line_total);
                days.push(record.day);
            }
            allocated_days.push((line.room_id, days));
        }

        verify_coverage(request.start_date, request.end_date, &allocated_days)?;

        let subtotal = PriceCalculator::subtotal(&line_totals);

        let mut discount = Decimal::ZERO;
        let mut coupon_id = None;
        if let Some(code) = &request.coupon_code {
            let coupon = self
                .coupon_repo
                .find_by_code(code)
                .await?
                .ok_or_else(|| {
                    BookingError::CouponInvalid(format!("Unknown coupon code '{}'", code))
                })?;

            if !coupon.is_usable(Utc::now()) {
                return Err(BookingError::CouponInvalid(format!(
                    "Coupon '{}' is not currently usable",
                    code
                )));
            }
            if !coupon.qualifies(subtotal) {
                return Err(BookingError::CouponInvalid(format!(
                    "Subtotal {} is below the minimum spend {} for coupon '{}'",
                    subtotal, coupon.min_spend, code
                )));
            }

            discount = coupon.discount;
            coupon_id = Some(coupon.id);
        }

        let total_price = PriceCalculator::apply_discount(subtotal, discount);
        let nights = (request.end_date - request.start_date).num_days() as i32;

        let booking = self
            .bookings_repo
            .create(
                &mut tx,
                NewBooking {
                    guest_id: request.guest_id,
                    start_date: request.start_date,
                    end_date: request.end_date,
                    nights,
                    subtotal,
                    discount,
                    total_price,
                    coupon_id,
                    guest_name: request.guest_name.clone(),
                    special_request: request.special_request.clone(),
                },
                &allocations,
            )
            .await?;

        tx.commit().await?;

        self.observer.status_changed(&StatusChangeEvent {
            booking_id: booking.id,
            old_status: None,
            new_status: BookingStatus::Unpaid,
            actor: format!("guest:{}", booking.guest_id),
        });

        tracing::info!(
            "Created booking {} for guest {}: {} night(s), total {}",
            booking.id,
            booking.guest_id,
            booking.nights,
            booking.total_price
        );

        let lines = self.allocations_repo.find_by_booking_id(booking.id).await?;
        Ok((booking, lines))
    }

    /// Apply a confirmed payment to a booking.
    ///
    /// Runs in its own transaction, decoupled from booking creation. The
    /// booking row is locked before the status is read, so the
    /// paid-equivalent check and the coupon use-count increment are
    /// serialized per booking id. Replays of an already-applied
    /// confirmation return the booking untouched, which keeps webhook
    /// re-delivery safe.
    pub async fn mark_paid(
        &self,
        booking_id: i32,
        trade_no: &str,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Booking, BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking = self
            .bookings_repo
            .find_for_update(&mut tx, booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if booking.status.is_paid_equivalent() {
            tracing::debug!(
                "Booking {} already {}; ignoring replayed confirmation",
                booking_id,
                booking.status
            );
            tx.commit().await?;
            return Ok(booking);
        }

        let old_status = booking.status;
        StatusMachine::transition(old_status, BookingStatus::Paid)
            .map_err(BookingError::InvalidTransition)?;

        let updated = self
            .bookings_repo
            .record_payment(&mut tx, booking_id, trade_no, paid_at.unwrap_or_else(Utc::now))
            .await?;

        // First entry into a paid-equivalent status: count the coupon use
        if let Some(coupon_id) = updated.coupon_id {
            self.coupon_repo
                .increment_use_count(&mut tx, coupon_id)
                .await?;
        }

        tx.commit().await?;

        self.observer.status_changed(&StatusChangeEvent {
            booking_id: updated.id,
            old_status: Some(old_status),
            new_status: BookingStatus::Paid,
            actor: "gateway".to_string(),
        });

        tracing::info!("Booking {} marked paid (trade {})", updated.id, trade_no);
        Ok(updated)
    }

    /// Cancel a booking on behalf of its owning guest.
    ///
    /// Allowed from unpaid or paid only; cancellation is a status change
    /// and does not restore inventory.
    pub async fn cancel_booking(
        &self,
        booking_id: i32,
        guest_id: i32,
    ) -> Result<Booking, BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking = self
            .bookings_repo
            .find_for_update(&mut tx, booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if booking.guest_id != guest_id {
            return Err(BookingError::Forbidden(
                "Only the owning guest may cancel this booking".to_string(),
            ));
        }

        match booking.status {
            BookingStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
            BookingStatus::Complete => return Err(BookingError::AlreadyComplete),
            _ => {}
        }

        let old_status = booking.status;
        StatusMachine::transition(old_status, BookingStatus::Cancelled)
            .map_err(BookingError::InvalidTransition)?;

        let updated = self
            .bookings_repo
            .update_status(&mut tx, booking_id, BookingStatus::Cancelled)
            .await?;

        tx.commit().await?;

        self.observer.status_changed(&StatusChangeEvent {
            booking_id: updated.id,
            old_status: Some(old_status),
            new_status: BookingStatus::Cancelled,
            actor: format!("guest:{}", guest_id),
        });

        tracing::info!("Booking {} cancelled by guest {}", updated.id, guest_id);
        Ok(updated)
    }

    /// Get a booking with its allocation lines; owner-only
    pub async fn get_booking(
        &self,
        booking_id: i32,
        guest_id: i32,
    ) -> Result<BookingResponse, BookingError> {
        let booking = self
            .bookings_repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if booking.guest_id != guest_id {
            return Err(BookingError::Forbidden(
                "You do not have permission to access this booking".to_string(),
            ));
        }

        let lines = self.allocations_repo.find_by_booking_id(booking.id).await?;
        Ok(BookingResponse::from_parts(booking, lines))
    }

    /// Booking history for a guest, newest first, optional status filter
    pub async fn get_guest_bookings(
        &self,
        guest_id: i32,
        status: Option<BookingStatus>,
    ) -> Result<Vec<BookingResponse>, BookingError> {
        let bookings = self.bookings_repo.find_by_guest(guest_id, status).await?;

        let mut responses = Vec::new();
        for booking in bookings {
            let lines = self.allocations_repo.find_by_booking_id(booking.id).await?;
            responses.push(BookingResponse::from_parts(booking, lines));
        }

        Ok(responses)
    }
}
