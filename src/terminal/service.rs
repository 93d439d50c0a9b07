//! Sale orchestration against the configured reader

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinHandle;

use super::collect::spawn_receipt_collection;
use super::lease::ReaderLease;
use super::poll::wait_for_success;
use crate::config::PollConfig;
use crate::error::{ServerError, ServerResult};
use crate::processor::{
    CreatePaymentIntent, PaymentIntent, PaymentProcessor, ProcessorError, Reader,
};

/// Metadata key carrying the customer's contact email
pub const CUSTOMER_EMAIL_METADATA_KEY: &str = "customer_email";

/// Incoming sale, before validation
#[derive(Debug, Clone, Default)]
pub struct SaleRequest {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub email: Option<String>,
    pub receipt_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Result of a completed reader transaction
#[derive(Debug)]
pub struct ProcessOutcome {
    pub payment_intent: PaymentIntent,
    /// Receipt prompt running detached; `None` when disabled
    pub receipt_collection: Option<JoinHandle<Result<(), ProcessorError>>>,
}

/// Drives payment intents through the single configured reader
pub struct PaymentService {
    processor: Arc<dyn PaymentProcessor>,
    lease: ReaderLease,
    default_currency: String,
    poll: PollConfig,
}

impl PaymentService {
    pub fn new(
        processor: Arc<dyn PaymentProcessor>,
        reader_id: impl Into<String>,
        default_currency: impl Into<String>,
        poll: PollConfig,
    ) -> Self {
        Self {
            processor,
            lease: ReaderLease::new(reader_id),
            default_currency: default_currency.into(),
            poll,
        }
    }

    pub fn reader_id(&self) -> &str {
        self.lease.reader_id()
    }

    /// True while a process-and-poll cycle holds the reader
    pub fn reader_busy(&self) -> bool {
        self.lease.is_busy()
    }

    /// Create a payment intent; returns the processor's object unchanged
    pub async fn create_payment_intent(&self, request: SaleRequest) -> ServerResult<PaymentIntent> {
        let params = self.build_params(request)?;

        tracing::info!(
            amount = params.amount,
            currency = %params.currency,
            has_receipt_email = params.receipt_email.is_some(),
            "Creating payment intent"
        );

        let intent = self
            .processor
            .create_payment_intent(&params)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Payment intent creation failed");
                ServerError::from(e)
            })?;

        tracing::info!(payment_intent = %intent.id, "Payment intent created");
        Ok(intent)
    }

    /// Hand a payment intent to the reader and wait for it to succeed
    ///
    /// Holds the reader lease until polling ends. On success the lease moves
    /// to the detached receipt prompt, which releases it once the prompt is
    /// sent; the prompt never affects the returned result.
    pub async fn process_on_reader(&self, payment_intent_id: &str) -> ServerResult<ProcessOutcome> {
        let payment_intent_id = payment_intent_id.trim();
        if payment_intent_id.is_empty() {
            return Err(ServerError::MissingField("payment_intent"));
        }

        let mut lease = self.lease.try_acquire()?;
        let reader_id = self.reader_id().to_string();

        tracing::info!(
            reader_id = %reader_id,
            payment_intent = %payment_intent_id,
            "Sending payment intent to reader"
        );

        self.processor
            .process_payment_intent(&reader_id, payment_intent_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    reader_id = %reader_id,
                    payment_intent = %payment_intent_id,
                    error = %e,
                    "Reader rejected payment intent"
                );
                ServerError::from(e)
            })?;

        let payment_intent = wait_for_success(
            self.processor.as_ref(),
            payment_intent_id,
            &self.poll,
            lease.cancel_signal(),
        )
        .await?;

        let receipt_collection = self.poll.collect_inputs.then(|| {
            spawn_receipt_collection(
                Arc::clone(&self.processor),
                lease,
                payment_intent.id.clone(),
                self.poll.collect_delay(),
            )
        });

        Ok(ProcessOutcome {
            payment_intent,
            receipt_collection,
        })
    }

    /// Cancel the reader's current action
    ///
    /// Does not take the lease so it can interrupt a transaction in flight.
    /// Once the processor accepts the cancel, the lease holder is notified:
    /// a running poll ends as `canceled` and a pending receipt prompt is
    /// skipped, freeing the reader for the next sale.
    pub async fn cancel_reader_action(&self) -> ServerResult<Reader> {
        let reader_id = self.reader_id();
        tracing::info!(reader_id = %reader_id, "Cancelling reader action");

        let reader = self
            .processor
            .cancel_reader_action(reader_id)
            .await
            .map_err(|e| {
                tracing::error!(reader_id = %reader_id, error = %e, "Reader cancel failed");
                ServerError::from(e)
            })?;

        self.lease.notify_cancel();
        Ok(reader)
    }

    fn build_params(&self, request: SaleRequest) -> ServerResult<CreatePaymentIntent> {
        let amount = request.amount.ok_or(ServerError::MissingField("amount"))?;
        if amount <= 0 {
            return Err(ServerError::InvalidArgument(format!(
                "amount must be a positive integer in the smallest currency unit, got {}",
                amount
            )));
        }

        let currency = normalize_currency(request.currency.as_deref(), &self.default_currency)?;
        let contact_email =
            resolve_contact_email(request.email.as_deref(), request.receipt_email.as_deref());

        let mut metadata = request.metadata;
        if let Some(email) = &contact_email {
            metadata.insert(CUSTOMER_EMAIL_METADATA_KEY.to_string(), email.clone());
        }

        Ok(CreatePaymentIntent {
            amount,
            currency,
            receipt_email: contact_email,
            metadata,
        })
    }
}

/// Pick the effective contact address: `email` wins over `receipt_email`
///
/// Blank values are ignored; the result is trimmed and lowercased.
pub fn resolve_contact_email(email: Option<&str>, receipt_email: Option<&str>) -> Option<String> {
    [email, receipt_email]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|e| !e.is_empty())
        .map(str::to_lowercase)
}

fn normalize_currency(currency: Option<&str>, default: &str) -> ServerResult<String> {
    let currency = match currency.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_lowercase(),
        _ => return Ok(default.to_lowercase()),
    };

    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ServerError::InvalidArgument(format!(
            "currency must be a three-letter ISO code, got '{}'",
            currency
        )));
    }
    Ok(currency)
}
