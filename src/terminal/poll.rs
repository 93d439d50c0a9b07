//! Payment intent status polling
//!
//! Iterative loop with an attempt cap. A `canceled` intent, or one sent back
//! to `requires_payment_method` with a decline attached, ends the loop as a
//! failure instead of being re-polled. A reader cancel ends it too: the
//! processor reports such an intent as plain `requires_payment_method`.

use tokio::sync::watch;
use tokio::time::sleep;

use crate::config::PollConfig;
use crate::error::{ServerError, ServerResult};
use crate::processor::{PaymentIntent, PaymentIntentStatus, PaymentProcessor};

/// Where a fetched payment intent sits in the reader flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentState {
    Succeeded,
    Failed { reason: Option<String> },
    Pending,
}

/// Classify one status snapshot
pub fn classify(intent: &PaymentIntent) -> IntentState {
    match intent.status {
        PaymentIntentStatus::Succeeded => IntentState::Succeeded,
        PaymentIntentStatus::Canceled => IntentState::Failed {
            reason: intent.failure_reason(),
        },
        PaymentIntentStatus::RequiresPaymentMethod if intent.last_payment_error.is_some() => {
            IntentState::Failed {
                reason: intent.failure_reason(),
            }
        }
        _ => IntentState::Pending,
    }
}

/// Poll until the intent succeeds, fails, or the attempt budget runs out
///
/// Sleeps `config.interval()` between checks, never after the last one.
/// Fetch errors count as attempts; `max_fetch_errors` consecutive failures
/// return the last error. A change on `cancel_signal` cuts the current sleep
/// short; the next still-pending status then ends as `canceled`.
pub async fn wait_for_success(
    processor: &dyn PaymentProcessor,
    payment_intent_id: &str,
    config: &PollConfig,
    cancel_signal: &mut watch::Receiver<u64>,
) -> ServerResult<PaymentIntent> {
    let mut consecutive_errors = 0u32;
    let mut cancelled = false;

    for attempt in 1..=config.max_attempts {
        if cancel_signal.has_changed().unwrap_or(false) {
            cancel_signal.borrow_and_update();
            cancelled = true;
        }

        match processor.retrieve_payment_intent(payment_intent_id).await {
            Ok(intent) => {
                consecutive_errors = 0;

                match classify(&intent) {
                    IntentState::Succeeded => {
                        tracing::info!(
                            payment_intent = %payment_intent_id,
                            attempt,
                            "Payment succeeded"
                        );
                        return Ok(intent);
                    }
                    IntentState::Failed { reason } => {
                        tracing::warn!(
                            payment_intent = %payment_intent_id,
                            attempt,
                            status = %intent.status,
                            reason = ?reason,
                            "Payment reached a failed state"
                        );
                        return Err(ServerError::PaymentFailed {
                            id: payment_intent_id.to_string(),
                            status: intent.status.to_string(),
                            reason,
                        });
                    }
                    IntentState::Pending if cancelled => {
                        tracing::info!(
                            payment_intent = %payment_intent_id,
                            attempt,
                            status = %intent.status,
                            "Reader action cancelled, ending poll"
                        );
                        return Err(ServerError::PaymentFailed {
                            id: payment_intent_id.to_string(),
                            status: PaymentIntentStatus::Canceled.to_string(),
                            reason: Some("cancelled on reader".to_string()),
                        });
                    }
                    IntentState::Pending => {
                        tracing::debug!(
                            payment_intent = %payment_intent_id,
                            attempt,
                            status = %intent.status,
                            "Payment still pending"
                        );
                    }
                }
            }
            Err(e) => {
                consecutive_errors += 1;
                tracing::warn!(
                    payment_intent = %payment_intent_id,
                    attempt,
                    consecutive_errors,
                    error = %e,
                    "Status check failed"
                );
                if consecutive_errors >= config.max_fetch_errors {
                    return Err(e.into());
                }
            }
        }

        if attempt < config.max_attempts {
            if cancelled {
                sleep(config.interval()).await;
            } else {
                tokio::select! {
                    _ = sleep(config.interval()) => {}
                    Ok(()) = cancel_signal.changed() => cancelled = true,
                }
            }
        }
    }

    tracing::error!(
        payment_intent = %payment_intent_id,
        attempts = config.max_attempts,
        "Gave up waiting for payment"
    );

    Err(ServerError::PollTimeout {
        id: payment_intent_id.to_string(),
        attempts: config.max_attempts,
    })
}
