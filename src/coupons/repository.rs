use sqlx::{PgPool, Postgres, Transaction};

use crate::coupons::Coupon;

/// Repository for coupon lookups and use-count accounting
#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    /// Create a new CouponRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a coupon by its public code
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, sqlx::Error> {
        let coupon = sqlx::query_as::<_, Coupon>(
            r#"
            SELECT id, code, discount, min_spend, active, used_count, expires_at
            FROM coupons
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Increment the use count for a coupon.
    ///
    /// Callers must hold the owning booking's row lock and only invoke this
    /// on the booking's first transition into a paid-equivalent status, so
    /// the count moves at most once per booking.
    pub async fn increment_use_count(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon_id: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE coupons SET used_count = used_count + 1 WHERE id = $1")
            .bind(coupon_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
