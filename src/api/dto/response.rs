//! Response DTOs

use serde::Serialize;

use crate::processor::PaymentIntent;

/// GET /ping
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
}

/// GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy"; no processor call is made
    pub status: String,

    pub reader_id: String,

    /// A transaction currently holds the reader
    pub reader_busy: bool,
}

/// POST /create-payment-intent
#[derive(Debug, Serialize)]
pub struct CreatePaymentIntentResponse {
    /// Processor-assigned payment intent id
    pub payment_intent: String,
}

/// POST /process-on-reader
#[derive(Debug, Serialize)]
pub struct ProcessOnReaderResponse {
    pub success: bool,

    /// Final payment intent as returned by the processor
    pub payment_intent: PaymentIntent,
}

/// POST /cancel-payment
#[derive(Debug, Serialize)]
pub struct CancelPaymentResponse {
    pub success: bool,
    pub message: String,
}

/// POST /webhook
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}
