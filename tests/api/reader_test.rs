//! Reader processing, polling and cancel tests

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::common::*;
use pos_terminal_server::processor::{
    MockPoll, MockProcessor, PaymentIntentStatus, ProcessorError,
};
use pos_terminal_server::PollConfig;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_process_on_reader_returns_final_intent() {
    let app = test_app(MockProcessor::succeeding_after(3));
    let start = Instant::now();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/process-on-reader",
            r#"{"payment_intent": "pi_live_1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["payment_intent"]["id"], "pi_live_1");
    assert_eq!(json["payment_intent"]["status"], "succeeded");

    assert_eq!(app.mock.process_call_count.load(Ordering::SeqCst), 1);
    assert_eq!(app.mock.retrieve_calls(), 3);
    assert!(start.elapsed() >= Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_receipt_prompt_runs_after_response() {
    let app = test_app(MockProcessor::succeeding_after(1));

    let response = app
        .router
        .clone()
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mock.collect_call_count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let collected = app.mock.collected();
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].0, TEST_READER_ID);
}

#[tokio::test(start_paused = true)]
async fn test_receipt_prompt_failure_does_not_affect_response() {
    let mock = MockProcessor::succeeding_after(1);
    mock.fail_collect(ProcessorError::Network("reader offline".into()));
    let app = test_app(mock);

    let response = app
        .router
        .clone()
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(app.mock.collect_call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_payment_intent_is_bad_request() {
    for body in [r#"{}"#, r#"{"payment_intent": ""}"#, ""] {
        let app = test_app(MockProcessor::new());

        let response = app
            .router
            .oneshot(post_json("/process-on-reader", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {:?}", body);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing required field: payment_intent");
        assert_eq!(app.mock.process_call_count.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_process_error_aborts_before_polling() {
    let mock = MockProcessor::new();
    mock.fail_process(ProcessorError::Api {
        status: 400,
        message: "Reader is offline".to_string(),
        code: Some("terminal_reader_offline".to_string()),
        decline_code: None,
    });
    let app = test_app(mock);

    let response = app
        .router
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Reader is offline");
    assert_eq!(app.mock.retrieve_calls(), 0);
}

/// Regression: a repeated `canceled` status must end polling instead of
/// looping forever.
#[tokio::test(start_paused = true)]
async fn test_repeated_canceled_stops_polling() {
    let app = test_app(MockProcessor::with_polls(vec![MockPoll::Status(
        PaymentIntentStatus::Canceled,
    )]));

    let response = app
        .router
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PAYMENT_FAILED");
    assert_eq!(app.mock.retrieve_calls(), 1);
    assert_eq!(app.mock.collect_call_count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stuck_payment_times_out() {
    let poll = PollConfig {
        max_attempts: 4,
        ..Default::default()
    };
    let app = test_app_with(
        MockProcessor::with_polls(vec![MockPoll::Status(PaymentIntentStatus::Processing)]),
        poll,
        std::env::temp_dir(),
    );

    let response = app
        .router
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "POLL_TIMEOUT");
    assert_eq!(json["recoverable"], true);
    assert_eq!(app.mock.retrieve_calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_declined_card_reports_reason() {
    let app = test_app(MockProcessor::with_polls(vec![
        MockPoll::Status(PaymentIntentStatus::Processing),
        MockPoll::Declined("Your card has insufficient funds.".to_string()),
    ]));

    let response = app
        .router
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Your card has insufficient funds."));
}

#[tokio::test(start_paused = true)]
async fn test_second_transaction_while_busy_is_conflict() {
    let app = test_app(MockProcessor::succeeding_after(3));

    let first = tokio::spawn(app.router.clone().oneshot(post_json(
        "/process-on-reader",
        r#"{"payment_intent": "pi_first"}"#,
    )));
    while !app.payments.reader_busy() {
        tokio::task::yield_now().await;
    }

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/process-on-reader",
            r#"{"payment_intent": "pi_second"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "READER_BUSY");

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(app.mock.process_call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancel_payment_always_succeeds() {
    let app = test_app(MockProcessor::new());

    // No transaction in progress
    let response = app
        .router
        .clone()
        .oneshot(post_empty("/cancel-payment"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Payment cancelled on reader");
    assert_eq!(app.mock.cancel_call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancel_payment_processor_error() {
    let mock = MockProcessor::new();
    mock.fail_cancel(ProcessorError::Api {
        status: 400,
        message: "Reader has no action to cancel".to_string(),
        code: None,
        decline_code: None,
    });
    let app = test_app(mock);

    let response = app
        .router
        .oneshot(post_empty("/cancel-payment"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "Reader has no action to cancel"
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_processing_ends_the_poll() {
    let app = test_app(MockProcessor::with_polls(vec![MockPoll::Status(
        PaymentIntentStatus::Processing,
    )]));

    let running = tokio::spawn(app.router.clone().oneshot(post_json(
        "/process-on-reader",
        r#"{"payment_intent": "pi_1"}"#,
    )));
    while !app.payments.reader_busy() {
        tokio::task::yield_now().await;
    }

    // A cancelled reader action leaves the intent awaiting a payment method
    app.mock.set_polls(vec![MockPoll::Status(
        PaymentIntentStatus::RequiresPaymentMethod,
    )]);
    let cancel = app
        .router
        .clone()
        .oneshot(post_empty("/cancel-payment"))
        .await
        .unwrap();
    assert_eq!(cancel.status(), StatusCode::OK);

    let response = running.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body_json(response).await["code"], "PAYMENT_FAILED");
    assert!(!app.payments.reader_busy());

    app.mock
        .set_polls(vec![MockPoll::Status(PaymentIntentStatus::Succeeded)]);
    let next = app
        .router
        .oneshot(post_json(
            "/process-on-reader",
            r#"{"payment_intent": "pi_2"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(next.status(), StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn test_next_sale_during_receipt_prompt_is_conflict() {
    let app = test_app(MockProcessor::succeeding_after(1));

    let first = app
        .router
        .clone()
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_1"}"#))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(400)).await;
    let second = app
        .router
        .clone()
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_2"}"#))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(app.mock.process_call_count.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(app.mock.collect_call_count.load(Ordering::SeqCst), 1);
    assert!(!app.payments.reader_busy());

    let retry = app
        .router
        .oneshot(post_json("/process-on-reader", r#"{"payment_intent": "pi_2"}"#))
        .await
        .unwrap();
    assert_eq!(retry.status(), StatusCode::OK);
    assert_eq!(app.mock.process_call_count.load(Ordering::SeqCst), 2);
}
