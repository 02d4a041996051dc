use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One ledger row: finite stock of one room on one calendar day, with the
/// price valid for that day. Uniquely keyed by (room_id, day).
///
/// `remaining` is only ever mutated by conditional decrement/increment; the
/// booking flow never creates or removes ledger rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventoryRecord {
    pub id: i32,
    pub room_id: i32,
    pub day: NaiveDate,
    pub total_stock: i32,
    pub remaining: i32,
    pub unit_price: Decimal,
}
