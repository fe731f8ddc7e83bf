//! Thread Registry - Which thread numbers are live
//!
//! Thread 0 is the main thread: it never runs transactions and allocates
//! straight into global space. Workers get numbers from 1 upwards, never
//! reused while the collector lives.

use crate::error::{Result, StmError};
use indexmap::IndexSet;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Number identifying a registered thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadNum(pub u32);

impl ThreadNum {
    pub const MAIN: ThreadNum = ThreadNum(0);

    #[inline]
    pub fn is_main(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ThreadNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ThreadRegistry - live thread numbers of one collector
pub struct ThreadRegistry {
    live: Mutex<IndexSet<ThreadNum>>,
    next_worker: AtomicU32,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self {
            live: Mutex::new(IndexSet::new()),
            next_worker: AtomicU32::new(1),
        }
    }

    /// Register the main thread
    ///
    /// # Returns
    /// `InvalidState` if a main thread is already registered.
    pub fn register_main(&self) -> Result<ThreadNum> {
        let mut live = self.live.lock();
        if !live.insert(ThreadNum::MAIN) {
            return Err(StmError::InvalidState {
                expected: "no main thread".to_string(),
                actual: "main thread already registered".to_string(),
            });
        }
        Ok(ThreadNum::MAIN)
    }

    /// Register a worker under a fresh number
    pub fn register_worker(&self) -> ThreadNum {
        let num = ThreadNum(self.next_worker.fetch_add(1, Ordering::Relaxed));
        self.live.lock().insert(num);
        num
    }

    /// Drop `num` from the live set
    ///
    /// # Returns
    /// false if `num` was not registered
    pub fn unregister(&self, num: ThreadNum) -> bool {
        self.live.lock().shift_remove(&num)
    }

    pub fn is_registered(&self, num: ThreadNum) -> bool {
        self.live.lock().contains(&num)
    }

    /// Live thread numbers in registration order
    pub fn live_threads(&self) -> Vec<ThreadNum> {
        self.live.lock().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.lock().is_empty()
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}
