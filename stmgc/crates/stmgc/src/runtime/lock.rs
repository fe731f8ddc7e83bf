//! STM Lock - Mutex aware of atomic transactions
//!
//! A thread inside an atomic transaction cannot be rescheduled to let the
//! lock holder run, so it must never block on a held lock. Such an attempt
//! fails with [`StmError::Deadlock`] instead of hanging.

use crate::error::{Result, StmError};
use crate::tls::StmThread;
use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// StmLock - lock that is not tied to a guard's scope
pub struct StmLock {
    raw: RawMutex,
    held: AtomicBool,
}

impl StmLock {
    pub fn new() -> Self {
        Self {
            raw: RawMutex::INIT,
            held: AtomicBool::new(false),
        }
    }

    /// Acquire the lock
    ///
    /// # Arguments
    /// * `thread` - The acquiring thread
    /// * `blocking` - Wait for the lock instead of failing when it is held
    ///
    /// # Returns
    /// Whether the lock was acquired; `Deadlock` when an atomic transaction
    /// asks to block on a held lock.
    pub fn acquire(&self, thread: &StmThread, blocking: bool) -> Result<bool> {
        let acquired = if thread.is_atomic() {
            let acquired = self.raw.try_lock();
            if blocking && !acquired {
                return Err(StmError::Deadlock(
                    "an atomic transaction tries to acquire a lock that is already acquired"
                        .to_string(),
                ));
            }
            acquired
        } else if blocking {
            self.raw.lock();
            true
        } else {
            self.raw.try_lock()
        };

        if acquired {
            self.held.store(true, Ordering::Release);
        }
        Ok(acquired)
    }

    /// Release the lock
    ///
    /// # Returns
    /// `LockNotHeld` if the lock is free.
    pub fn release(&self) -> Result<()> {
        if !self.held.swap(false, Ordering::AcqRel) {
            return Err(StmError::LockNotHeld);
        }
        // held was true, so the raw mutex is locked
        unsafe { self.raw.unlock() };
        Ok(())
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl Default for StmLock {
    fn default() -> Self {
        Self::new()
    }
}
