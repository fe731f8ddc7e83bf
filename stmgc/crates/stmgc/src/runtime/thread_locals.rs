//! Thread Locals - Check interval and thread-mode switch
//!
//! The check interval starts at the configured default. Until threads are
//! set up it is only remembered; from then on every change is pushed to
//! the substrate as the transaction length, and the external-call hooks
//! become active.

use crate::error::{Result, StmError};
use crate::substrate::StmOperations;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// StmThreadLocals - process-wide transaction-length configuration
pub struct StmThreadLocals {
    substrate: Arc<dyn StmOperations>,
    check_interval: AtomicUsize,
    threads_running: AtomicBool,
}

impl StmThreadLocals {
    pub fn new(substrate: Arc<dyn StmOperations>, check_interval: usize) -> Self {
        Self {
            substrate,
            check_interval: AtomicUsize::new(check_interval),
            threads_running: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn check_interval(&self) -> usize {
        self.check_interval.load(Ordering::Relaxed)
    }

    /// Change the check interval
    ///
    /// # Returns
    /// `InvalidArgument` for 0.
    pub fn set_check_interval(&self, interval: usize) -> Result<()> {
        if interval == 0 {
            return Err(StmError::InvalidArgument(
                "check interval must be > 0".to_string(),
            ));
        }
        self.check_interval.store(interval, Ordering::Relaxed);
        self.configure_transaction_length();
        Ok(())
    }

    /// Switch to threaded mode
    ///
    /// Pushes the current interval to the substrate and activates the
    /// external-call hooks. Calling it again reconfigures.
    pub fn setup_threads(&self) {
        self.threads_running.store(true, Ordering::Release);
        self.configure_transaction_length();
        log::debug!(
            "threads running, transaction length {}",
            self.check_interval()
        );
    }

    #[inline]
    pub fn threads_running(&self) -> bool {
        self.threads_running.load(Ordering::Acquire)
    }

    fn configure_transaction_length(&self) {
        if self.threads_running() {
            self.substrate
                .set_transaction_length(self.check_interval());
        }
    }
}
