//! Emulated STM - In-process substrate for tests and single-process use
//!
//! Keeps per-thread bookkeeping under a mutex and records every commit.
//! Misuse (nested begin, commit outside a transaction, unknown thread)
//! panics: with a real substrate it would corrupt the process.

use crate::substrate::StmOperations;
use crate::tls::{ThreadNum, TransactionalCopy};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One recorded commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub thread: ThreadNum,
    pub copies: Vec<TransactionalCopy>,
}

#[derive(Debug, Default)]
struct Slot {
    in_transaction: bool,
    atomic: usize,
    in_external_call: bool,
    callback_depth: usize,
}

/// EmulatedStm - bookkeeping-only substrate
#[derive(Debug, Default)]
pub struct EmulatedStm {
    slots: Mutex<IndexMap<ThreadNum, Slot>>,
    commits: Mutex<Vec<CommitRecord>>,
    aborts: AtomicUsize,
    transaction_length: AtomicUsize,
}

impl EmulatedStm {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slot<R>(&self, thread: ThreadNum, f: impl FnOnce(&mut Slot) -> R) -> R {
        let mut slots = self.slots.lock();
        match slots.get_mut(&thread) {
            Some(slot) => f(slot),
            None => panic!("thread {} has no substrate slot", thread),
        }
    }

    /// Every commit so far, oldest first
    pub fn commits(&self) -> Vec<CommitRecord> {
        self.commits.lock().clone()
    }

    /// Most recent commit of `thread`
    pub fn last_commit(&self, thread: ThreadNum) -> Option<CommitRecord> {
        self.commits
            .lock()
            .iter()
            .rev()
            .find(|c| c.thread == thread)
            .cloned()
    }

    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::Relaxed)
    }

    /// Last value passed to `set_transaction_length` (0 if never set)
    pub fn transaction_length(&self) -> usize {
        self.transaction_length.load(Ordering::Relaxed)
    }

    pub fn has_slot(&self, thread: ThreadNum) -> bool {
        self.slots.lock().contains_key(&thread)
    }

    pub fn in_external_call(&self, thread: ThreadNum) -> bool {
        self.with_slot(thread, |slot| slot.in_external_call)
    }

    pub fn callback_depth(&self, thread: ThreadNum) -> usize {
        self.with_slot(thread, |slot| slot.callback_depth)
    }
}

impl StmOperations for EmulatedStm {
    fn set_tls(&self, thread: ThreadNum) {
        let mut slots = self.slots.lock();
        if slots.insert(thread, Slot::default()).is_some() {
            panic!("substrate slot of thread {} installed twice", thread);
        }
    }

    fn del_tls(&self, thread: ThreadNum) {
        if self.slots.lock().shift_remove(&thread).is_none() {
            panic!("thread {} has no substrate slot", thread);
        }
    }

    fn begin_inevitable_transaction(&self, thread: ThreadNum) {
        self.with_slot(thread, |slot| {
            assert!(
                !slot.in_transaction,
                "thread {} begins a transaction inside a transaction",
                thread
            );
            slot.in_transaction = true;
        });
    }

    fn commit_transaction(&self, thread: ThreadNum, copies: &[TransactionalCopy]) {
        self.with_slot(thread, |slot| {
            assert!(
                slot.in_transaction,
                "thread {} commits outside a transaction",
                thread
            );
            slot.in_transaction = false;
        });
        self.commits.lock().push(CommitRecord {
            thread,
            copies: copies.to_vec(),
        });
    }

    fn abort_transaction(&self, thread: ThreadNum) {
        self.with_slot(thread, |slot| {
            slot.in_transaction = false;
            slot.atomic = 0;
        });
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    fn in_transaction(&self, thread: ThreadNum) -> bool {
        self.with_slot(thread, |slot| slot.in_transaction)
    }

    fn set_transaction_length(&self, length: usize) {
        self.transaction_length.store(length, Ordering::Relaxed);
    }

    fn is_atomic(&self, thread: ThreadNum) -> bool {
        self.with_slot(thread, |slot| slot.atomic > 0)
    }

    fn increment_atomic(&self, thread: ThreadNum) {
        self.with_slot(thread, |slot| slot.atomic += 1);
    }

    fn decrement_atomic(&self, thread: ThreadNum) {
        self.with_slot(thread, |slot| {
            assert!(slot.atomic > 0, "thread {} leaves an atomic section it never entered", thread);
            slot.atomic -= 1;
        });
    }

    fn before_external_call(&self, thread: ThreadNum) {
        self.with_slot(thread, |slot| {
            assert!(!slot.in_external_call, "thread {} nests external calls", thread);
            slot.in_external_call = true;
        });
    }

    fn after_external_call(&self, thread: ThreadNum) {
        self.with_slot(thread, |slot| {
            assert!(slot.in_external_call, "thread {} is not in an external call", thread);
            slot.in_external_call = false;
        });
    }

    fn enter_callback_call(&self, thread: ThreadNum) {
        self.with_slot(thread, |slot| slot.callback_depth += 1);
    }

    fn leave_callback_call(&self, thread: ThreadNum) {
        self.with_slot(thread, |slot| {
            assert!(slot.callback_depth > 0, "thread {} leaves a callback it never entered", thread);
            slot.callback_depth -= 1;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: ThreadNum = ThreadNum(1);

    #[test]
    fn test_transaction_bookkeeping() {
        let stm = EmulatedStm::new();
        stm.set_tls(T1);
        assert!(!stm.in_transaction(T1));

        stm.begin_inevitable_transaction(T1);
        assert!(stm.in_transaction(T1));

        let copies = [TransactionalCopy {
            original: 0x1000,
            copy: 0x2000,
        }];
        stm.commit_transaction(T1, &copies);
        assert!(!stm.in_transaction(T1));
        assert_eq!(stm.last_commit(T1).unwrap().copies, copies.to_vec());

        stm.del_tls(T1);
        assert!(!stm.has_slot(T1));
    }

    #[test]
    #[should_panic(expected = "inside a transaction")]
    fn test_nested_begin_panics() {
        let stm = EmulatedStm::new();
        stm.set_tls(T1);
        stm.begin_inevitable_transaction(T1);
        stm.begin_inevitable_transaction(T1);
    }

    #[test]
    fn test_atomic_depth() {
        let stm = EmulatedStm::new();
        stm.set_tls(T1);
        stm.increment_atomic(T1);
        stm.increment_atomic(T1);
        stm.decrement_atomic(T1);
        assert!(stm.is_atomic(T1));
        stm.decrement_atomic(T1);
        assert!(!stm.is_atomic(T1));
    }

    #[test]
    fn test_extcall_hooks() {
        let stm = EmulatedStm::new();
        stm.set_tls(T1);
        stm.before_external_call(T1);
        assert!(stm.in_external_call(T1));
        stm.after_external_call(T1);
        stm.enter_callback_call(T1);
        assert_eq!(stm.callback_depth(T1), 1);
        stm.leave_callback_call(T1);
        assert_eq!(stm.callback_depth(T1), 0);
    }

    #[test]
    #[should_panic(expected = "has no substrate slot")]
    fn test_unknown_thread_panics() {
        EmulatedStm::new().in_transaction(ThreadNum(7));
    }
}
