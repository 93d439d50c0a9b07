//! Mock payment processor for testing
//!
//! Scripted status sequences and failure injection, with call counters for
//! assertions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::PaymentProcessor;
use super::error::ProcessorError;
use super::types::{
    CollectInput, CreatePaymentIntent, LastPaymentError, PaymentIntent, PaymentIntentStatus,
    Reader,
};

/// Scripted result for one `retrieve_payment_intent` call
#[derive(Debug, Clone)]
pub enum MockPoll {
    Status(PaymentIntentStatus),
    /// `requires_payment_method` with a decline attached
    Declined(String),
    Error(ProcessorError),
}

/// Mock processor
///
/// `retrieve_payment_intent` pops from the scripted queue; once the queue is
/// empty the last entry repeats forever.
pub struct MockProcessor {
    /// Id handed out by `create_payment_intent`
    pub next_intent_id: String,

    create_error: Mutex<Option<ProcessorError>>,
    process_error: Mutex<Option<ProcessorError>>,
    cancel_error: Mutex<Option<ProcessorError>>,
    collect_error: Mutex<Option<ProcessorError>>,

    polls: Mutex<VecDeque<MockPoll>>,
    last_poll: Mutex<MockPoll>,

    created: Mutex<Vec<CreatePaymentIntent>>,
    collected: Mutex<Vec<(String, Vec<CollectInput>)>>,

    pub create_call_count: AtomicUsize,
    pub retrieve_call_count: AtomicUsize,
    pub process_call_count: AtomicUsize,
    pub cancel_call_count: AtomicUsize,
    pub collect_call_count: AtomicUsize,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self {
            next_intent_id: "pi_mock_123".to_string(),
            create_error: Mutex::new(None),
            process_error: Mutex::new(None),
            cancel_error: Mutex::new(None),
            collect_error: Mutex::new(None),
            polls: Mutex::new(VecDeque::new()),
            last_poll: Mutex::new(MockPoll::Status(PaymentIntentStatus::Succeeded)),
            created: Mutex::new(Vec::new()),
            collected: Mutex::new(Vec::new()),
            create_call_count: AtomicUsize::new(0),
            retrieve_call_count: AtomicUsize::new(0),
            process_call_count: AtomicUsize::new(0),
            cancel_call_count: AtomicUsize::new(0),
            collect_call_count: AtomicUsize::new(0),
        }
    }
}

impl MockProcessor {
    /// Mock whose payment intents succeed on the first status check
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the results of successive status checks
    pub fn with_polls(polls: Vec<MockPoll>) -> Self {
        let mock = Self::default();
        mock.set_polls(polls);
        mock
    }

    /// `processing` for `n - 1` checks, then `succeeded`
    pub fn succeeding_after(n: usize) -> Self {
        let mut polls = vec![MockPoll::Status(PaymentIntentStatus::Processing); n.saturating_sub(1)];
        polls.push(MockPoll::Status(PaymentIntentStatus::Succeeded));
        Self::with_polls(polls)
    }

    /// Id returned by `create_payment_intent`
    pub fn with_intent_id(mut self, id: impl Into<String>) -> Self {
        self.next_intent_id = id.into();
        self
    }

    pub fn set_polls(&self, polls: Vec<MockPoll>) {
        let mut queue = self.polls.lock().unwrap();
        if let Some(last) = polls.last() {
            *self.last_poll.lock().unwrap() = last.clone();
        }
        *queue = polls.into();
    }

    pub fn fail_create(&self, error: ProcessorError) {
        *self.create_error.lock().unwrap() = Some(error);
    }

    pub fn fail_process(&self, error: ProcessorError) {
        *self.process_error.lock().unwrap() = Some(error);
    }

    pub fn fail_cancel(&self, error: ProcessorError) {
        *self.cancel_error.lock().unwrap() = Some(error);
    }

    pub fn fail_collect(&self, error: ProcessorError) {
        *self.collect_error.lock().unwrap() = Some(error);
    }

    /// Parameters of every `create_payment_intent` call, in order
    pub fn created(&self) -> Vec<CreatePaymentIntent> {
        self.created.lock().unwrap().clone()
    }

    /// Reader id and inputs of every `collect_inputs` call, in order
    pub fn collected(&self) -> Vec<(String, Vec<CollectInput>)> {
        self.collected.lock().unwrap().clone()
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_call_count.load(Ordering::SeqCst)
    }

    fn next_poll(&self) -> MockPoll {
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last_poll.lock().unwrap().clone())
    }

    fn intent(&self, id: &str, status: PaymentIntentStatus) -> PaymentIntent {
        PaymentIntent {
            id: id.to_string(),
            status,
            amount: 0,
            currency: "usd".to_string(),
            receipt_email: None,
            metadata: Default::default(),
            last_payment_error: None,
            extra: Default::default(),
        }
    }

    fn reader(reader_id: &str, action: &str) -> Reader {
        Reader {
            id: reader_id.to_string(),
            label: Some("Mock reader".to_string()),
            status: Some("online".to_string()),
            action: Some(serde_json::json!({ "type": action, "status": "in_progress" })),
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, ProcessorError> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        self.created.lock().unwrap().push(params.clone());

        if let Some(e) = self.create_error.lock().unwrap().clone() {
            return Err(e);
        }

        let mut intent = self.intent(
            &self.next_intent_id,
            PaymentIntentStatus::RequiresPaymentMethod,
        );
        intent.amount = params.amount;
        intent.currency = params.currency.clone();
        intent.receipt_email = params.receipt_email.clone();
        intent.metadata = params.metadata.clone();
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, ProcessorError> {
        self.retrieve_call_count.fetch_add(1, Ordering::SeqCst);

        match self.next_poll() {
            MockPoll::Status(status) => Ok(self.intent(id, status)),
            MockPoll::Declined(message) => {
                let mut intent = self.intent(id, PaymentIntentStatus::RequiresPaymentMethod);
                intent.last_payment_error = Some(LastPaymentError {
                    message: Some(message),
                    code: Some("card_declined".to_string()),
                    decline_code: Some("generic_decline".to_string()),
                });
                Ok(intent)
            }
            MockPoll::Error(e) => Err(e),
        }
    }

    async fn process_payment_intent(
        &self,
        reader_id: &str,
        _payment_intent_id: &str,
    ) -> Result<Reader, ProcessorError> {
        self.process_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(e) = self.process_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(Self::reader(reader_id, "process_payment_intent"))
    }

    async fn cancel_reader_action(&self, reader_id: &str) -> Result<Reader, ProcessorError> {
        self.cancel_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(e) = self.cancel_error.lock().unwrap().clone() {
            return Err(e);
        }
        let mut reader = Self::reader(reader_id, "none");
        reader.action = None;
        Ok(reader)
    }

    async fn collect_inputs(
        &self,
        reader_id: &str,
        inputs: &[CollectInput],
    ) -> Result<Reader, ProcessorError> {
        self.collect_call_count.fetch_add(1, Ordering::SeqCst);
        self.collected
            .lock()
            .unwrap()
            .push((reader_id.to_string(), inputs.to_vec()));

        if let Some(e) = self.collect_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(Self::reader(reader_id, "collect_inputs"))
    }
}
