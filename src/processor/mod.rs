//! Payment processor integration
//!
//! The processor owns every piece of payment state. This module only moves
//! requests to it and decodes what comes back.

pub mod client;
pub mod error;
pub mod mock;
pub mod stripe;
pub mod types;

pub use client::PaymentProcessor;
pub use error::ProcessorError;
pub use mock::{MockPoll, MockProcessor};
pub use stripe::StripeClient;
pub use types::{
    CollectInput, CollectInputKind, CreatePaymentIntent, LastPaymentError, PaymentIntent,
    PaymentIntentStatus, Reader,
};
