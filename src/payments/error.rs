/// Error types for payment gateway operations
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Malformed trade number: {0}")]
    MalformedTradeNumber(String),
}
