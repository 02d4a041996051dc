use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A discount coupon. `used_count` is owned by this module and incremented
/// at most once per booking, on the booking's first transition into a
/// paid-equivalent status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    pub id: i32,
    pub code: String,
    pub discount: Decimal,
    pub min_spend: Decimal,
    pub active: bool,
    pub used_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Whether the coupon can be applied at all at the given instant
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }

    /// Whether a booking subtotal qualifies for this coupon
    pub fn qualifies(&self, subtotal: Decimal) -> bool {
        subtotal >= self.min_spend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(active: bool, expires_at: Option<DateTime<Utc>>) -> Coupon {
        Coupon {
            id: 1,
            code: "SAVE100".to_string(),
            discount: dec!(100),
            min_spend: dec!(1500),
            active,
            used_count: 0,
            expires_at,
        }
    }

    #[test]
    fn test_inactive_coupon_not_usable() {
        assert!(!coupon(false, None).is_usable(Utc::now()));
    }

    #[test]
    fn test_expired_coupon_not_usable() {
        let now = Utc::now();
        assert!(!coupon(true, Some(now - Duration::hours(1))).is_usable(now));
        assert!(coupon(true, Some(now + Duration::hours(1))).is_usable(now));
    }

    #[test]
    fn test_min_spend_boundary() {
        let c = coupon(true, None);
        assert!(!c.qualifies(dec!(1499.99)));
        assert!(c.qualifies(dec!(1500)));
        assert!(c.qualifies(dec!(2000)));
    }
}
