//! Request DTOs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::terminal::SaleRequest;

/// Request body for POST /create-payment-intent
#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Amount in the smallest currency unit
    #[serde(default)]
    pub amount: Option<i64>,

    #[serde(default)]
    pub currency: Option<String>,

    /// Preferred contact address
    #[serde(default)]
    pub email: Option<String>,

    /// Fallback contact address when `email` is absent
    #[serde(default)]
    pub receipt_email: Option<String>,

    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl From<CreatePaymentIntentRequest> for SaleRequest {
    fn from(req: CreatePaymentIntentRequest) -> Self {
        SaleRequest {
            amount: req.amount,
            currency: req.currency,
            email: req.email,
            receipt_email: req.receipt_email,
            metadata: req.metadata.unwrap_or_default(),
        }
    }
}

/// Request body for POST /process-on-reader
#[derive(Debug, Default, Deserialize)]
pub struct ProcessOnReaderRequest {
    #[serde(default)]
    pub payment_intent: Option<String>,
}
