//! pos-terminal-server library exports (for testing)

pub mod api;
pub mod config;
pub mod error;
pub mod processor;
pub mod terminal;

// Re-exports
pub use config::{Config, PollConfig, ProcessorConfig};
pub use error::{ServerError, ServerResult};
pub use processor::{PaymentProcessor, StripeClient};
pub use terminal::PaymentService;
