//! Exclusive use of the terminal reader

use std::sync::Arc;

use tokio::sync::{watch, Mutex, OwnedMutexGuard};

use crate::error::{ServerError, ServerResult};

/// Guards the single configured reader against overlapping transactions
///
/// Acquisition never waits: a second caller gets `ReaderBusy` immediately.
/// Cancels are broadcast to whoever holds the lease at the time.
#[derive(Debug, Clone)]
pub struct ReaderLease {
    reader_id: String,
    lock: Arc<Mutex<()>>,
    cancels: Arc<watch::Sender<u64>>,
}

/// Held for the duration of one transaction, receipt prompt included
#[derive(Debug)]
pub struct ReaderGuard {
    reader_id: String,
    cancels: watch::Receiver<u64>,
    _guard: OwnedMutexGuard<()>,
}

impl ReaderGuard {
    pub fn reader_id(&self) -> &str {
        &self.reader_id
    }

    /// Cancel notifications sent since this guard was acquired
    pub fn cancel_signal(&mut self) -> &mut watch::Receiver<u64> {
        &mut self.cancels
    }
}

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        tracing::debug!(reader_id = %self.reader_id, "Reader lease released");
    }
}

impl ReaderLease {
    pub fn new(reader_id: impl Into<String>) -> Self {
        let (cancels, _) = watch::channel(0);
        Self {
            reader_id: reader_id.into(),
            lock: Arc::new(Mutex::new(())),
            cancels: Arc::new(cancels),
        }
    }

    pub fn reader_id(&self) -> &str {
        &self.reader_id
    }

    pub fn try_acquire(&self) -> ServerResult<ReaderGuard> {
        let guard = Arc::clone(&self.lock)
            .try_lock_owned()
            .map_err(|_| ServerError::ReaderBusy(self.reader_id.clone()))?;

        tracing::debug!(reader_id = %self.reader_id, "Reader lease acquired");

        Ok(ReaderGuard {
            reader_id: self.reader_id.clone(),
            cancels: self.cancels.subscribe(),
            _guard: guard,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    /// Tell the current holder, if any, that the reader action was cancelled
    pub fn notify_cancel(&self) {
        self.cancels.send_modify(|generation| *generation += 1);
    }
}
