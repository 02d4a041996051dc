// Booking status change events
//
// The booking service and the payment webhook reconciler emit an event for
// every status change instead of being intercepted transparently. An external
// audit collaborator can subscribe by installing its own observer; the default
// observer just logs the transition.

use crate::bookings::BookingStatus;

/// A single booking status transition, as seen by observers
#[derive(Debug, Clone)]
pub struct StatusChangeEvent {
    pub booking_id: i32,
    /// None for the initial creation of a booking
    pub old_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    /// Who drove the transition, e.g. "guest:42" or "gateway"
    pub actor: String,
}

/// Observer for booking status changes
pub trait StatusChangeObserver: Send + Sync {
    fn status_changed(&self, event: &StatusChangeEvent);
}

/// Default observer: records transitions in the application log
pub struct TracingObserver;

impl StatusChangeObserver for TracingObserver {
    fn status_changed(&self, event: &StatusChangeEvent) {
        match event.old_status {
            Some(old) => tracing::info!(
                "Booking {} status changed {} -> {} (actor: {})",
                event.booking_id,
                old,
                event.new_status,
                event.actor
            ),
            None => tracing::info!(
                "Booking {} created with status {} (actor: {})",
                event.booking_id,
                event.new_status,
                event.actor
            ),
        }
    }
}
