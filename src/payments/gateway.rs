// Payment gateway adapter
//
// Builds the outbound checkout parameter set the client forwards to the
// gateway. The parameters are signed with the CheckMacValue derivation in
// `signature`; the gateway later confirms the result asynchronously on the
// webhook endpoint.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::bookings::Booking;
use crate::payments::{signature, trade_number};

/// Gateway credentials and endpoints, loaded from the environment.
/// Defaults are the gateway's public sandbox values.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub merchant_id: String,
    pub hash_key: String,
    pub hash_iv: String,
    /// Where the client submits the signed checkout form
    pub checkout_url: String,
    /// Server-to-server webhook target the gateway calls back
    pub return_url: String,
    /// Where the gateway sends the guest's browser afterwards
    pub client_back_url: String,
}

impl GatewayConfig {
    /// Load gateway settings from the environment, falling back to the
    /// sandbox credentials
    pub fn from_env() -> Self {
        Self {
            merchant_id: std::env::var("GATEWAY_MERCHANT_ID")
                .unwrap_or_else(|_| "2000132".to_string()),
            hash_key: std::env::var("GATEWAY_HASH_KEY")
                .unwrap_or_else(|_| "5294y06JbISpM5x9".to_string()),
            hash_iv: std::env::var("GATEWAY_HASH_IV")
                .unwrap_or_else(|_| "v77hoKGq4kWxNNIS".to_string()),
            checkout_url: std::env::var("GATEWAY_CHECKOUT_URL").unwrap_or_else(|_| {
                "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5".to_string()
            }),
            return_url: std::env::var("GATEWAY_RETURN_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api/payments/webhook".to_string()),
            client_back_url: std::env::var("GATEWAY_CLIENT_BACK_URL")
                .unwrap_or_else(|_| "http://localhost:8080/".to_string()),
        }
    }
}

/// A gateway-ready checkout form: submission URL plus the signed fields
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutParams {
    pub action_url: String,
    pub fields: BTreeMap<String, String>,
}

/// Adapter building signed checkout requests for one configured gateway
#[derive(Clone)]
pub struct PaymentGateway {
    config: GatewayConfig,
}

impl PaymentGateway {
    /// Create a new PaymentGateway
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the signed checkout parameter set for a booking.
    ///
    /// The CheckMacValue covers every field except ReturnURL and the
    /// signature field itself; the webhook callback does not echo
    /// ReturnURL, so verification stays symmetric.
    pub fn checkout_params(&self, booking: &Booking, item_name: &str) -> CheckoutParams {
        let now = Utc::now();
        let trade_no = trade_number::encode(booking.id, now.timestamp_millis());

        let mut signed = BTreeMap::new();
        signed.insert("MerchantID".to_string(), self.config.merchant_id.clone());
        signed.insert("MerchantTradeNo".to_string(), trade_no);
        signed.insert(
            "MerchantTradeDate".to_string(),
            now.format("%Y/%m/%d %H:%M:%S").to_string(),
        );
        signed.insert("PaymentType".to_string(), "aio".to_string());
        signed.insert(
            "TotalAmount".to_string(),
            booking.total_price.round().to_string(),
        );
        signed.insert("TradeDesc".to_string(), "Room reservation".to_string());
        signed.insert("ItemName".to_string(), item_name.to_string());
        signed.insert("ChoosePayment".to_string(), "ALL".to_string());
        signed.insert("EncryptType".to_string(), "1".to_string());
        signed.insert(
            "ClientBackURL".to_string(),
            self.config.client_back_url.clone(),
        );

        let check_mac = signature::generate(&signed, &self.config.hash_key, &self.config.hash_iv);

        let mut fields = signed;
        fields.insert("ReturnURL".to_string(), self.config.return_url.clone());
        fields.insert(signature::CHECK_MAC_FIELD.to_string(), check_mac);

        CheckoutParams {
            action_url: self.config.checkout_url.clone(),
            fields,
        }
    }
}
