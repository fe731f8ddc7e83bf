//! Substrate Interface - The transactional machinery underneath
//!
//! Conflict detection, atomic commit and thread slots belong to the
//! substrate; this crate only prepares what a commit needs (the audit list
//! of local copies) and calls in at transaction boundaries and around
//! external calls.
//!
//! [`EmulatedStm`] is an in-process implementation with single-version
//! bookkeeping and no conflict detection.

pub mod emulated;

pub use emulated::{CommitRecord, EmulatedStm};

use crate::tls::{ThreadNum, TransactionalCopy};

/// Operations consumed from the transactional substrate
///
/// Every call names the thread it acts for; a real substrate keeps this in
/// its own thread-local slot installed by `set_tls`.
pub trait StmOperations: Send + Sync {
    /// Install the per-thread slot of `thread`
    fn set_tls(&self, thread: ThreadNum);

    /// Remove the per-thread slot of `thread`
    fn del_tls(&self, thread: ThreadNum);

    fn begin_inevitable_transaction(&self, thread: ThreadNum);

    /// Commit (suspend) the running transaction
    ///
    /// `copies` is the audit list of local copies made in it.
    fn commit_transaction(&self, thread: ThreadNum, copies: &[TransactionalCopy]);

    fn abort_transaction(&self, thread: ThreadNum);

    fn in_transaction(&self, thread: ThreadNum) -> bool;

    /// Length of a transaction before a break is requested
    fn set_transaction_length(&self, length: usize);

    /// Whether `thread` is inside a non-preemptible (atomic) transaction
    fn is_atomic(&self, thread: ThreadNum) -> bool;

    fn increment_atomic(&self, thread: ThreadNum);

    fn decrement_atomic(&self, thread: ThreadNum);

    fn before_external_call(&self, thread: ThreadNum);

    fn after_external_call(&self, thread: ThreadNum);

    fn enter_callback_call(&self, thread: ThreadNum);

    fn leave_callback_call(&self, thread: ThreadNum);
}
