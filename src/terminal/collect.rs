//! Post-payment receipt prompt on the reader

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::lease::ReaderGuard;
use crate::processor::{CollectInput, PaymentProcessor, ProcessorError};

/// Ask the reader for optional receipt email/phone after a short delay
///
/// Runs detached from the request that triggered it and keeps the reader
/// lease until the prompt has been sent, so the next sale cannot start
/// underneath it. A cancel during the delay skips the prompt. Failures are
/// logged and reported only through the returned handle, which callers may
/// drop.
pub fn spawn_receipt_collection(
    processor: Arc<dyn PaymentProcessor>,
    mut lease: ReaderGuard,
    payment_intent_id: String,
    delay: Duration,
) -> JoinHandle<Result<(), ProcessorError>> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            Ok(()) = lease.cancel_signal().changed() => {
                tracing::info!(
                    reader_id = %lease.reader_id(),
                    payment_intent = %payment_intent_id,
                    "Reader cancelled before receipt prompt, skipping"
                );
                return Ok(());
            }
        }

        let inputs = [CollectInput::receipt_email(), CollectInput::receipt_phone()];

        match processor.collect_inputs(lease.reader_id(), &inputs).await {
            Ok(_) => {
                tracing::info!(
                    reader_id = %lease.reader_id(),
                    payment_intent = %payment_intent_id,
                    "Receipt input collection started on reader"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    reader_id = %lease.reader_id(),
                    payment_intent = %payment_intent_id,
                    error = %e,
                    "Receipt input collection failed"
                );
                Err(e)
            }
        }
    })
}
