// HTTP handlers for inventory availability lookups

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::inventory::{InventoryError, InventoryRecord};

/// Query parameters for an availability lookup
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Handler for GET /api/rooms/{room_id}/availability
/// Returns the ledger rows for a room over a half-open date range
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/availability",
    params(
        ("room_id" = i32, Path, description = "Room ID"),
        ("start" = String, Query, description = "First night (inclusive), ISO date"),
        ("end" = String, Query, description = "Check-out date (exclusive), ISO date")
    ),
    responses(
        (status = 200, description = "Inventory rows for the range", body = Vec<InventoryRecord>),
        (status = 500, description = "Internal server error")
    ),
    tag = "inventory"
)]
pub async fn room_availability_handler(
    State(state): State<crate::AppState>,
    Path(room_id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<InventoryRecord>>, InventoryError> {
    tracing::debug!(
        "Fetching availability for room {} from {} to {}",
        room_id,
        query.start,
        query.end
    );

    let records = state
        .inventory_repo
        .find_for_range(room_id, query.start, query.end)
        .await?;

    Ok(Json(records))
}
