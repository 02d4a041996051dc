use crate::bookings::BookingStatus;

/// Service for managing booking status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Unpaid → Paid, Cancelled
    /// - Paid → Complete, Cancelled
    /// - Complete → (terminal)
    /// - Cancelled → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: BookingStatus, to: BookingStatus) -> bool {
        // Same status is always valid (idempotent)
        if from == to {
            return true;
        }

        match (from, to) {
            (BookingStatus::Unpaid, BookingStatus::Paid) => true,
            (BookingStatus::Unpaid, BookingStatus::Cancelled) => true,
            (BookingStatus::Paid, BookingStatus::Complete) => true,
            (BookingStatus::Paid, BookingStatus::Cancelled) => true,
            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: BookingStatus, to: BookingStatus) -> Result<BookingStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid status transition from {} to {}", from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaid_to_paid() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Unpaid,
            BookingStatus::Paid
        ));
    }

    #[test]
    fn test_unpaid_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Unpaid,
            BookingStatus::Cancelled
        ));
    }

    #[test]
    fn test_paid_to_complete() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Paid,
            BookingStatus::Complete
        ));
    }

    #[test]
    fn test_paid_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Paid,
            BookingStatus::Cancelled
        ));
    }

    #[test]
    fn test_unpaid_to_complete_rejected() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Unpaid,
            BookingStatus::Complete
        ));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Cancelled,
            BookingStatus::Unpaid
        ));
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Cancelled,
            BookingStatus::Paid
        ));
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Cancelled,
            BookingStatus::Complete
        ));
    }

    #[test]
    fn test_complete_cannot_be_cancelled() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Complete,
            BookingStatus::Cancelled
        ));
    }

    #[test]
    fn test_complete_cannot_go_backward() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Complete,
            BookingStatus::Paid
        ));
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Complete,
            BookingStatus::Unpaid
        ));
    }

    #[test]
    fn test_paid_cannot_go_backward() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Paid,
            BookingStatus::Unpaid
        ));
    }

    #[test]
    fn test_transition_valid() {
        let result = StatusMachine::transition(BookingStatus::Unpaid, BookingStatus::Paid);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), BookingStatus::Paid);
    }

    #[test]
    fn test_transition_invalid() {
        let result = StatusMachine::transition(BookingStatus::Unpaid, BookingStatus::Complete);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid status transition"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Helper to generate BookingStatus
    fn booking_status_strategy() -> impl Strategy<Value = BookingStatus> {
        prop_oneof![
            Just(BookingStatus::Unpaid),
            Just(BookingStatus::Paid),
            Just(BookingStatus::Complete),
            Just(BookingStatus::Cancelled),
        ]
    }

    /// Same-status transitions are always valid (idempotent), which is
    /// what makes replayed payment webhooks safe to re-apply
    #[test]
    fn prop_same_status_is_valid() {
        proptest!(|(status in booking_status_strategy())| {
            prop_assert!(
                StatusMachine::is_valid_transition(status, status),
                "Transition from {} to itself should be valid",
                status
            );
        });
    }

    /// Complete and Cancelled are terminal: no transition leaves them
    #[test]
    fn prop_terminal_states() {
        proptest!(|(to in booking_status_strategy())| {
            for terminal in [BookingStatus::Complete, BookingStatus::Cancelled] {
                if to != terminal {
                    prop_assert!(
                        !StatusMachine::is_valid_transition(terminal, to),
                        "No transition should be allowed from {} to {}",
                        terminal,
                        to
                    );
                }
            }
        });
    }

    /// transition() and is_valid_transition() agree for every pair
    #[test]
    fn prop_transition_consistency() {
        proptest!(|(
            from in booking_status_strategy(),
            to in booking_status_strategy()
        )| {
            let is_valid = StatusMachine::is_valid_transition(from, to);
            let transition_result = StatusMachine::transition(from, to);

            if is_valid {
                prop_assert!(transition_result.is_ok());
                prop_assert_eq!(transition_result.unwrap(), to);
            } else {
                prop_assert!(transition_result.is_err());
            }
        });
    }

    /// Cancellation is reachable from exactly the non-terminal states
    #[test]
    fn prop_cancellable_from_unpaid_and_paid_only() {
        proptest!(|(from in booking_status_strategy())| {
            let expected = matches!(from, BookingStatus::Unpaid | BookingStatus::Paid)
                || from == BookingStatus::Cancelled; // idempotent same-status
            prop_assert_eq!(
                StatusMachine::is_valid_transition(from, BookingStatus::Cancelled),
                expected
            );
        });
    }
}
