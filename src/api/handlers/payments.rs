//! Payment intent and reader handlers

use std::sync::Arc;

use axum::{body::Body, extract::State, Json};

use super::helpers::read_json;
use crate::api::dto::{
    CancelPaymentResponse, CreatePaymentIntentRequest, CreatePaymentIntentResponse,
    ProcessOnReaderRequest, ProcessOnReaderResponse,
};
use crate::api::state::AppState;
use crate::error::{ServerError, ServerResult};

/// POST /create-payment-intent
pub async fn create_payment_intent(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> ServerResult<Json<CreatePaymentIntentResponse>> {
    let req: CreatePaymentIntentRequest = read_json(body).await?;

    let intent = state.payments.create_payment_intent(req.into()).await?;

    Ok(Json(CreatePaymentIntentResponse {
        payment_intent: intent.id,
    }))
}

/// POST /process-on-reader
///
/// Responds once the payment succeeds. The receipt prompt keeps running
/// after the response is sent.
pub async fn process_on_reader(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> ServerResult<Json<ProcessOnReaderResponse>> {
    let req: ProcessOnReaderRequest = read_json(body).await?;
    let payment_intent_id = req
        .payment_intent
        .ok_or(ServerError::MissingField("payment_intent"))?;

    let outcome = state.payments.process_on_reader(&payment_intent_id).await?;

    // Detached: the handle is dropped, the task keeps running
    drop(outcome.receipt_collection);

    Ok(Json(ProcessOnReaderResponse {
        success: true,
        payment_intent: outcome.payment_intent,
    }))
}

/// POST /cancel-payment
pub async fn cancel_payment(
    State(state): State<Arc<AppState>>,
) -> ServerResult<Json<CancelPaymentResponse>> {
    state.payments.cancel_reader_action().await?;

    Ok(Json(CancelPaymentResponse {
        success: true,
        message: "Payment cancelled on reader".to_string(),
    }))
}
