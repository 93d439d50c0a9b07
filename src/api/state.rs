//! Application state shared across HTTP handlers

use std::path::PathBuf;
use std::sync::Arc;

use crate::terminal::PaymentService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Sale orchestration bound to the configured reader
    pub payments: Arc<PaymentService>,

    /// Directory holding the landing and POS pages
    pub static_dir: PathBuf,
}
