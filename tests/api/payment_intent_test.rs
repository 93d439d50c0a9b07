//! Payment intent creation tests

use std::sync::atomic::Ordering;

use crate::common::*;
use pos_terminal_server::processor::{MockProcessor, ProcessorError};

#[tokio::test]
async fn test_create_returns_processor_id() {
    let app = test_app(MockProcessor::new().with_intent_id("pi_3Nabc"));

    let response = app
        .router
        .oneshot(post_json("/create-payment-intent", r#"{"amount": 1999}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["payment_intent"], "pi_3Nabc");
    assert_eq!(json.as_object().unwrap().len(), 1);

    let created = app.mock.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].amount, 1999);
    assert_eq!(created[0].currency, "usd");
}

#[tokio::test]
async fn test_missing_amount_is_bad_request_without_processor_call() {
    let bodies = [
        r#"{}"#,
        r#"{"currency": "usd", "email": "a@b.co"}"#,
        r#"{"amount": null}"#,
    ];

    for body in bodies {
        let app = test_app(MockProcessor::new());

        let response = app
            .router
            .oneshot(post_json("/create-payment-intent", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing required field: amount");
        assert_eq!(app.mock.create_call_count.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_empty_body_is_missing_amount() {
    let app = test_app(MockProcessor::new());

    let response = app
        .router
        .oneshot(post_empty("/create-payment-intent"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MISSING_FIELD");
}

#[tokio::test]
async fn test_invalid_amounts_are_bad_request() {
    for body in [
        r#"{"amount": 0}"#,
        r#"{"amount": -50}"#,
        r#"{"amount": 10.5}"#,
        r#"{"amount": "1000"}"#,
    ] {
        let app = test_app(MockProcessor::new());

        let response = app
            .router
            .oneshot(post_json("/create-payment-intent", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(app.mock.create_call_count.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_email_takes_precedence_over_receipt_email() {
    let app = test_app(MockProcessor::new());

    let response = app
        .router
        .oneshot(post_json(
            "/create-payment-intent",
            r#"{"amount": 500, "email": "first@shop.test", "receipt_email": "second@shop.test"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let created = app.mock.created();
    assert_eq!(created[0].receipt_email.as_deref(), Some("first@shop.test"));
    assert_eq!(created[0].metadata["customer_email"], "first@shop.test");
}

#[tokio::test]
async fn test_receipt_email_alone_is_used() {
    let app = test_app(MockProcessor::new());

    app.router
        .oneshot(post_json(
            "/create-payment-intent",
            r#"{"amount": 500, "receipt_email": "only@shop.test"}"#,
        ))
        .await
        .unwrap();

    let created = app.mock.created();
    assert_eq!(created[0].receipt_email.as_deref(), Some("only@shop.test"));
    assert_eq!(created[0].metadata["customer_email"], "only@shop.test");
}

#[tokio::test]
async fn test_metadata_and_currency_are_forwarded() {
    let app = test_app(MockProcessor::new());

    app.router
        .oneshot(post_json(
            "/create-payment-intent",
            r#"{"amount": 750, "currency": "CAD", "metadata": {"order_id": "A-17", "lane": "2"}}"#,
        ))
        .await
        .unwrap();

    let created = app.mock.created();
    assert_eq!(created[0].currency, "cad");
    assert_eq!(created[0].metadata["order_id"], "A-17");
    assert_eq!(created[0].metadata["lane"], "2");
    assert!(!created[0].metadata.contains_key("customer_email"));
}

#[tokio::test]
async fn test_processor_error_is_500_with_message() {
    let mock = MockProcessor::new();
    mock.fail_create(ProcessorError::Api {
        status: 400,
        message: "Amount must be at least $0.50 usd".to_string(),
        code: Some("amount_too_small".to_string()),
        decline_code: None,
    });
    let app = test_app(mock);

    let response = app
        .router
        .oneshot(post_json("/create-payment-intent", r#"{"amount": 10}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Amount must be at least $0.50 usd");
    assert_eq!(json["code"], "PROCESSOR_ERROR");
    assert_eq!(app.mock.create_call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app(MockProcessor::new());

    let response = app
        .router
        .oneshot(post_json("/create-payment-intent", "{amount: 5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");
}
