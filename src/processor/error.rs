//! Payment processor error types

use thiserror::Error;

/// Errors returned by the payment processor client
#[derive(Debug, Clone, Error)]
pub enum ProcessorError {
    /// The processor answered with an error envelope
    ///
    /// Display is the processor's message verbatim so it can be passed
    /// straight through to the HTTP caller.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        decline_code: Option<String>,
    },

    /// Network communication error
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout
    #[error("timeout after {0} seconds")]
    Timeout(u64),

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ProcessorError {
    /// Transport-level failures a caller may retry
    pub fn is_transient(&self) -> bool {
        match self {
            ProcessorError::Network(_) | ProcessorError::Timeout(_) => true,
            ProcessorError::Api { status, .. } => *status == 429 || *status >= 500,
            ProcessorError::InvalidResponse(_) | ProcessorError::InvalidUrl(_) => false,
        }
    }
}
