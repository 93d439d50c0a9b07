//! Stripe API client

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::client::PaymentProcessor;
use super::error::ProcessorError;
use super::types::{CollectInput, CreatePaymentIntent, ErrorEnvelope, PaymentIntent, Reader};
use crate::config::ProcessorConfig;

/// HTTP client for the Stripe REST API
///
/// Requests are form-encoded and authenticated with the secret key as a
/// bearer token.
pub struct StripeClient {
    client: reqwest::Client,
    api_base: Url,
    secret_key: String,
    timeout: Duration,
}

impl fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    pub fn new(config: &ProcessorConfig) -> Result<Self, ProcessorError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProcessorError::Network(e.to_string()))?;

        let api_base = Url::parse(&config.api_base)
            .map_err(|e| ProcessorError::InvalidUrl(format!("{}: {}", config.api_base, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(ProcessorError::InvalidUrl(config.api_base.clone()));
        }

        Ok(Self {
            client,
            api_base,
            secret_key: config.secret_key.clone(),
            timeout,
        })
    }

    /// Join path segments onto the API base, percent-encoding each one
    ///
    /// Empty, `.` and `..` segments are rejected.
    fn url(&self, segments: &[&str]) -> Result<Url, ProcessorError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ProcessorError::InvalidUrl(format!(
                "invalid path segment '{}'",
                bad
            )));
        }

        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ProcessorError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ProcessorError {
        if e.is_timeout() {
            ProcessorError::Timeout(self.timeout.as_secs())
        } else if e.is_connect() {
            ProcessorError::Network(format!("connection failed: {}", e))
        } else {
            ProcessorError::Network(e.to_string())
        }
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ProcessorError> {
        let url = self.url(segments)?;
        tracing::debug!(path = %url.path(), "GET processor");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        self.decode_response(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: &[(String, String)],
    ) -> Result<T, ProcessorError> {
        let url = self.url(segments)?;
        tracing::debug!(path = %url.path(), fields = form.len(), "POST processor");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        self.decode_response(response).await
    }

    /// Decode a success body, or turn the error envelope into `ProcessorError::Api`
    async fn decode_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ProcessorError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| ProcessorError::InvalidResponse(e.to_string()))
    }
}

fn api_error(status: u16, body: &[u8]) -> ProcessorError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let err = envelope.error;
            let message = err
                .message
                .or_else(|| err.error_type.clone())
                .unwrap_or_else(|| format!("processor returned status {}", status));
            ProcessorError::Api {
                status,
                message,
                code: err.code,
                decline_code: err.decline_code,
            }
        }
        Err(_) => ProcessorError::Api {
            status,
            message: format!("processor returned status {}", status),
            code: None,
            decline_code: None,
        },
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, ProcessorError> {
        self.post_form(&["v1", "payment_intents"], &params.to_form())
            .await
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, ProcessorError> {
        self.get(&["v1", "payment_intents", id]).await
    }

    async fn process_payment_intent(
        &self,
        reader_id: &str,
        payment_intent_id: &str,
    ) -> Result<Reader, ProcessorError> {
        let form = vec![(
            "payment_intent".to_string(),
            payment_intent_id.to_string(),
        )];
        self.post_form(
            &["v1", "terminal", "readers", reader_id, "process_payment_intent"],
            &form,
        )
        .await
    }

    async fn cancel_reader_action(&self, reader_id: &str) -> Result<Reader, ProcessorError> {
        self.post_form(
            &["v1", "terminal", "readers", reader_id, "cancel_action"],
            &[],
        )
        .await
    }

    async fn collect_inputs(
        &self,
        reader_id: &str,
        inputs: &[CollectInput],
    ) -> Result<Reader, ProcessorError> {
        self.post_form(
            &["v1", "terminal", "readers", reader_id, "collect_inputs"],
            &CollectInput::to_form(inputs),
        )
        .await
    }
}
