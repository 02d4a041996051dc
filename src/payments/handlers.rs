// Payment webhook reconciler
//
// The gateway POSTs its asynchronous result here, form-encoded and signed.
// The reply is a plain two-part token: "1|OK" acknowledges the delivery,
// anything else makes the gateway deliver again. Because `mark_paid` is
// idempotent, arbitrary re-delivery is safe.

use axum::{extract::State, Form};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::BTreeMap;

use crate::bookings::BookingError;
use crate::payments::{signature, trade_number};

/// Acknowledgment token understood by the gateway
pub const WEBHOOK_OK: &str = "1|OK";

/// Rejection token for a failed signature check
pub const WEBHOOK_BAD_MAC: &str = "0|CheckMacValue Error";

fn reject(reason: &str) -> String {
    format!("0|{}", reason)
}

/// Parse the gateway's payment timestamp, e.g. "2025/11/01 12:34:56"
fn parse_payment_date(params: &BTreeMap<String, String>) -> Option<DateTime<Utc>> {
    let raw = params.get("PaymentDate")?;
    NaiveDateTime::parse_from_str(raw, "%Y/%m/%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Handler for POST /api/payments/webhook
/// Reconciles a gateway payment result with its booking
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    responses(
        (status = 200, description = "Acknowledgment token: \"1|OK\" on success, \"0|<reason>\" otherwise", body = String)
    ),
    tag = "payments"
)]
pub async fn payment_webhook_handler(
    State(state): State<crate::AppState>,
    Form(params): Form<BTreeMap<String, String>>,
) -> String {
    let config = state.gateway.config();

    // 1. Authenticate the delivery before touching any booking
    if !signature::verify(&params, &config.hash_key, &config.hash_iv) {
        tracing::warn!("Webhook rejected: CheckMacValue mismatch");
        return WEBHOOK_BAD_MAC.to_string();
    }

    // 2. Recover the booking id from the trade reference
    let Some(trade_no) = params.get("MerchantTradeNo") else {
        tracing::warn!("Webhook rejected: missing MerchantTradeNo");
        return reject("TradeNo Error");
    };
    let booking_id = match trade_number::decode(trade_no) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Webhook rejected: {}", e);
            return reject("TradeNo Error");
        }
    };

    // 3. Only a success result transitions the booking
    let rtn_code = params.get("RtnCode").map(String::as_str).unwrap_or("");
    if rtn_code != "1" {
        tracing::info!(
            "Payment for booking {} reported as failed (RtnCode {})",
            booking_id,
            rtn_code
        );
        return reject("Payment Failed");
    }

    let paid_at = parse_payment_date(&params);
    match state
        .booking_service
        .mark_paid(booking_id, trade_no, paid_at)
        .await
    {
        Ok(_) => WEBHOOK_OK.to_string(),
        Err(BookingError::NotFound) => {
            tracing::warn!("Webhook for unknown booking {}", booking_id);
            reject("Booking Not Found")
        }
        Err(BookingError::InvalidTransition(msg)) => {
            tracing::warn!("Webhook for booking {} rejected: {}", booking_id, msg);
            reject("Booking State Error")
        }
        Err(e) => {
            tracing::error!("Webhook processing failed for booking {}: {}", booking_id, e);
            reject("Server Error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_token_shape() {
        assert_eq!(reject("Payment Failed"), "0|Payment Failed");
        assert_eq!(WEBHOOK_OK, "1|OK");
        assert_eq!(WEBHOOK_BAD_MAC, "0|CheckMacValue Error");
    }

    #[test]
    fn test_parse_payment_date() {
        let mut params = BTreeMap::new();
        params.insert(
            "PaymentDate".to_string(),
            "2025/11/01 12:34:56".to_string(),
        );
        let parsed = parse_payment_date(&params).unwrap();
        assert_eq!(
            parsed.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2025-11-01 12:34:56"
        );
    }

    #[test]
    fn test_parse_payment_date_absent_or_malformed() {
        assert!(parse_payment_date(&BTreeMap::new()).is_none());

        let mut params = BTreeMap::new();
        params.insert("PaymentDate".to_string(), "yesterday".to_string());
        assert!(parse_payment_date(&params).is_none());
    }
}
