use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;

/// Error types for inventory ledger operations
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("No inventory on sale for room {room_id} on {day}")]
    RecordNotFound { room_id: i32, day: NaiveDate },

    #[error("Insufficient stock for room {room_id} on {day}")]
    InsufficientStock { room_id: i32, day: NaiveDate },
}

impl From<sqlx::Error> for InventoryError {
    fn from(err: sqlx::Error) -> Self {
        InventoryError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            InventoryError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            InventoryError::RecordNotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            InventoryError::InsufficientStock { .. } => (StatusCode::CONFLICT, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
