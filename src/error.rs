//! Server error types

use axum::http::StatusCode;
use thiserror::Error;

pub use crate::processor::ProcessorError;

/// Main server error type
#[derive(Debug, Error)]
pub enum ServerError {
    // ========== Client Errors ==========
    /// Required request field absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Malformed or out-of-range request value
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Another transaction currently holds the reader
    #[error("reader {0} is busy with another transaction")]
    ReaderBusy(String),

    // ========== Transaction Outcome Errors ==========
    /// The payment intent reached a terminal non-success status
    #[error("payment {id} did not succeed (status: {status}){}", reason_suffix(.reason))]
    PaymentFailed {
        id: String,
        status: String,
        reason: Option<String>,
    },

    /// Polling gave up before a terminal status was observed
    #[error("payment {id} did not reach a terminal status after {attempts} status checks")]
    PollTimeout { id: String, attempts: u32 },

    // ========== Processor Errors ==========
    /// Outbound call to the payment processor failed
    #[error("{0}")]
    Processor(#[from] ProcessorError),

    // ========== Server Errors ==========
    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {}", r))
        .unwrap_or_default()
}

/// Server result type alias
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ServerError::MissingField(_) | ServerError::InvalidArgument(_) => {
                StatusCode::BAD_REQUEST
            }

            // 402 Payment Required
            ServerError::PaymentFailed { .. } => StatusCode::PAYMENT_REQUIRED,

            // 409 Conflict
            ServerError::ReaderBusy(_) => StatusCode::CONFLICT,

            // 504 Gateway Timeout
            ServerError::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error
            ServerError::Processor(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::MissingField(_) => "MISSING_FIELD",
            ServerError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ServerError::ReaderBusy(_) => "READER_BUSY",
            ServerError::PaymentFailed { .. } => "PAYMENT_FAILED",
            ServerError::PollTimeout { .. } => "POLL_TIMEOUT",
            ServerError::Processor(_) => "PROCESSOR_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Check if error is recoverable (client can retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            ServerError::ReaderBusy(_) | ServerError::PollTimeout { .. } => true,
            ServerError::Processor(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::InvalidArgument(format!("Invalid JSON: {}", e))
    }
}
