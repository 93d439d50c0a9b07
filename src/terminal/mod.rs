//! Card-present sale flow on the terminal reader
//!
//! create intent -> process on reader -> poll until terminal status ->
//! (detached) prompt for receipt details.

pub mod collect;
pub mod lease;
pub mod poll;
pub mod service;

pub use collect::spawn_receipt_collection;
pub use lease::{ReaderGuard, ReaderLease};
pub use poll::{classify, wait_for_success, IntentState};
pub use service::{
    resolve_contact_email, PaymentService, ProcessOutcome, SaleRequest,
    CUSTOMER_EMAIL_METADATA_KEY,
};
