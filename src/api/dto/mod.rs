//! Data Transfer Objects (DTOs)

mod request;
mod response;

pub use request::{CreatePaymentIntentRequest, ProcessOnReaderRequest};
pub use response::{
    CancelPaymentResponse, CreatePaymentIntentResponse, HealthResponse, PingResponse,
    ProcessOnReaderResponse, WebhookAck,
};
