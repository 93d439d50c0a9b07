//! Processor wire types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Payment intent lifecycle status as reported by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    /// Any status this server does not know about
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentIntentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentIntentStatus::RequiresConfirmation => "requires_confirmation",
            PaymentIntentStatus::RequiresAction => "requires_action",
            PaymentIntentStatus::Processing => "processing",
            PaymentIntentStatus::RequiresCapture => "requires_capture",
            PaymentIntentStatus::Canceled => "canceled",
            PaymentIntentStatus::Succeeded => "succeeded",
            PaymentIntentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error attached to a payment intent after a failed attempt (e.g. card decline)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPaymentError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
}

/// Processor-side payment intent
///
/// Fields not modelled here are kept in `extra` so the object can be
/// returned to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub last_payment_error: Option<LastPaymentError>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PaymentIntent {
    /// Decline message from the last failed attempt, if any
    pub fn failure_reason(&self) -> Option<String> {
        self.last_payment_error
            .as_ref()
            .and_then(|e| e.message.clone().or_else(|| e.code.clone()))
    }
}

/// Parameters for creating a card-present payment intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePaymentIntent {
    /// Amount in the smallest currency unit
    pub amount: i64,
    pub currency: String,
    /// Address the processor sends the receipt to on success
    pub receipt_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl CreatePaymentIntent {
    /// Flatten into the processor's form encoding
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), self.amount.to_string()),
            ("currency".to_string(), self.currency.clone()),
            (
                "payment_method_types[]".to_string(),
                "card_present".to_string(),
            ),
            ("capture_method".to_string(), "automatic".to_string()),
        ];

        if let Some(email) = &self.receipt_email {
            form.push(("receipt_email".to_string(), email.clone()));
        }

        for (key, value) in &self.metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }

        form
    }
}

/// Kind of input requested on the reader screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectInputKind {
    Email,
    Phone,
}

impl CollectInputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectInputKind::Email => "email",
            CollectInputKind::Phone => "phone",
        }
    }
}

/// One prompt shown on the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectInput {
    pub kind: CollectInputKind,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
}

impl CollectInput {
    /// Optional receipt email prompt
    pub fn receipt_email() -> Self {
        Self {
            kind: CollectInputKind::Email,
            title: "Email receipt".to_string(),
            description: Some("Enter your email to receive a receipt".to_string()),
            required: false,
        }
    }

    /// Optional receipt phone prompt
    pub fn receipt_phone() -> Self {
        Self {
            kind: CollectInputKind::Phone,
            title: "Text receipt".to_string(),
            description: Some("Enter your phone number to receive a receipt".to_string()),
            required: false,
        }
    }

    /// Flatten a list of inputs into the processor's form encoding
    pub fn to_form(inputs: &[CollectInput]) -> Vec<(String, String)> {
        let mut form = Vec::new();
        for (i, input) in inputs.iter().enumerate() {
            form.push((format!("inputs[{}][type]", i), input.kind.as_str().to_string()));
            form.push((format!("inputs[{}][custom_text][title]", i), input.title.clone()));
            if let Some(description) = &input.description {
                form.push((
                    format!("inputs[{}][custom_text][description]", i),
                    description.clone(),
                ));
            }
            form.push((format!("inputs[{}][required]", i), input.required.to_string()));
        }
        form
    }
}

/// Terminal reader as returned by reader actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub action: Option<serde_json::Value>,
}

/// Error envelope returned by the processor on non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
}
