use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use crate::inventory::{InventoryError, InventoryRecord};

/// Repository for the per (room, day) inventory ledger
#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    /// Create a new InventoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomically decrement stock for one (room, day) key.
    ///
    /// The check-and-subtract is a single conditional UPDATE guarded by the
    /// stock predicate, so two callers racing for the last unit can never
    /// both succeed. Fails with `InsufficientStock` when the predicate does
    /// not hold; stock is never clamped to zero.
    ///
    /// Runs on the caller's transaction: a later rollback restores every
    /// decrement made in the same attempt.
    pub async fn decrement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room_id: i32,
        day: NaiveDate,
        quantity: i32,
    ) -> Result<InventoryRecord, InventoryError> {
        let record = sqlx::query_as::<_, InventoryRecord>(
            r#"
            UPDATE room_inventory
            SET remaining = remaining - $3
            WHERE room_id = $1 AND day = $2 AND remaining >= $3
            RETURNING id, room_id, day, total_stock, remaining, unit_price
            "#,
        )
        .bind(room_id)
        .bind(day)
        .bind(quantity)
        .fetch_optional(&mut **tx)
        .await?;

        match record {
            Some(record) => Ok(record),
            None => {
                // Distinguish a day that is not on sale from one that is sold out
                let exists: Option<bool> = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM room_inventory WHERE room_id = $1 AND day = $2)",
                )
                .bind(room_id)
                .bind(day)
                .fetch_one(&mut **tx)
                .await?;

                if exists.unwrap_or(false) {
                    Err(InventoryError::InsufficientStock { room_id, day })
                } else {
                    Err(InventoryError::RecordNotFound { room_id, day })
                }
            }
        }
    }

    /// Compensating add-back for a previously decremented ledger row
    pub async fn increment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        inventory_id: i32,
        quantity: i32,
    ) -> Result<(), InventoryError> {
        let result = sqlx::query(
            r#"
            UPDATE room_inventory
            SET remaining = remaining + $2
            WHERE id = $1 AND remaining + $2 <= total_stock
            "#,
        )
        .bind(inventory_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::DatabaseError(format!(
                "Increment rejected for inventory record {}",
                inventory_id
            )));
        }

        Ok(())
    }

    /// Ledger rows for a room over the half-open range [start, end),
    /// ordered by day. Flat value rows, no entity graph behind them.
    pub async fn find_for_range(
        &self,
        room_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InventoryRecord>, InventoryError> {
        let records = sqlx::query_as::<_, InventoryRecord>(
            r#"
            SELECT id, room_id, day, total_stock, remaining, unit_price
            FROM room_inventory
            WHERE room_id = $1 AND day >= $2 AND day < $3
            ORDER BY day
            "#,
        )
        .bind(room_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
