//! HTTP request handlers

mod helpers;
mod payments;
mod system;

pub use payments::{cancel_payment, create_payment_intent, process_on_reader};
pub use system::{health_check, ping, webhook};
