//! Payment processor client trait

use async_trait::async_trait;

use super::error::ProcessorError;
use super::types::{CollectInput, CreatePaymentIntent, PaymentIntent, Reader};

/// Outbound operations against the payment processor and its terminal readers
///
/// Every method is a single request; none of them retry.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a card-present payment intent
    async fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, ProcessorError>;

    /// Fetch the current state of a payment intent
    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, ProcessorError>;

    /// Hand a payment intent to a reader for card presentment
    async fn process_payment_intent(
        &self,
        reader_id: &str,
        payment_intent_id: &str,
    ) -> Result<Reader, ProcessorError>;

    /// Cancel whatever action the reader is performing
    async fn cancel_reader_action(&self, reader_id: &str) -> Result<Reader, ProcessorError>;

    /// Show input prompts on the reader screen
    async fn collect_inputs(
        &self,
        reader_id: &str,
        inputs: &[CollectInput],
    ) -> Result<Reader, ProcessorError>;
}
