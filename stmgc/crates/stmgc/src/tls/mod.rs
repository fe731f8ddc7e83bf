//! Thread-Local State - One per live thread
//!
//! [`StmThread`] owns everything a thread touches without synchronization:
//! its nursery, its tldict of local copies, the audit list of copies made
//! in the current transaction, and its shadow stack of roots. It is only
//! ever used through `&mut self` by the owning thread.
//!
//! The barriers, localization, identity and the transaction lifecycle are
//! implemented as further `impl StmThread` blocks in their own modules.

pub mod registry;
pub mod roots;
pub mod tldict;

pub use registry::{ThreadNum, ThreadRegistry};
pub use roots::ShadowStack;
pub use tldict::{LocalCopies, TransactionalCopy};

use crate::allocator::Nursery;
use crate::error::{Result, StmError};
use crate::gc::StmGc;
use crate::logging::StmEvent;
use crate::object::header::{header, Revision};
use std::sync::Arc;

/// Transaction state of a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    NoTransaction,
    InTransaction,
}

/// StmThread - per-thread STM state
///
/// Created by [`StmGc::main_thread`] or [`StmGc::worker_thread`]. Dropping
/// it deregisters the thread; a transaction still running at that point is
/// aborted. Use [`teardown`](Self::teardown) to commit it instead.
pub struct StmThread {
    gc: Arc<StmGc>,
    num: ThreadNum,
    pub(crate) nursery: Nursery,
    pub(crate) tldict: LocalCopies,
    pub(crate) transactional_copies: Vec<TransactionalCopy>,
    pub(crate) roots: ShadowStack,
    pub(crate) state: TransactionState,
}

impl StmThread {
    pub(crate) fn new(gc: Arc<StmGc>, num: ThreadNum) -> Result<Self> {
        let nursery = Nursery::new(gc.config().nursery_size)?;
        gc.substrate().set_tls(num);
        StmEvent::ThreadStart { thread: num.0 }.emit();

        Ok(Self {
            gc,
            num,
            nursery,
            tldict: LocalCopies::new(),
            transactional_copies: Vec::new(),
            roots: ShadowStack::new(),
            state: TransactionState::NoTransaction,
        })
    }

    #[inline]
    pub fn num(&self) -> ThreadNum {
        self.num
    }

    #[inline]
    pub fn gc(&self) -> &Arc<StmGc> {
        &self.gc
    }

    #[inline]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    #[inline]
    pub fn in_transaction(&self) -> bool {
        self.state == TransactionState::InTransaction
    }

    #[inline]
    pub fn nursery(&self) -> &Nursery {
        &self.nursery
    }

    /// The tldict of the current transaction
    #[inline]
    pub fn local_copies(&self) -> &LocalCopies {
        &self.tldict
    }

    /// Audit list of copies made in the current transaction
    #[inline]
    pub fn transactional_copies(&self) -> &[TransactionalCopy] {
        &self.transactional_copies
    }

    // === Allocation ===

    /// Raw nursery allocation of `size` bytes
    ///
    /// Successive calls return adjacent ranges. The memory is not an object
    /// and is dropped at the next local collection.
    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        self.nursery.allocate(size)
    }

    /// Allocate a zeroed object of type `tid`
    ///
    /// Inside a transaction the object is fresh and local (no flags set,
    /// immediately writable). Outside one, including always on the main
    /// thread, it is allocated global.
    ///
    /// A full nursery triggers a local collection and one retry. Addresses
    /// of nursery objects not held in a root slot are invalid afterwards.
    ///
    /// # Panics
    /// Panics on an unregistered type id.
    pub fn allocate_object(&mut self, tid: u16) -> Result<usize> {
        if !self.in_transaction() {
            return self.gc.allocate_global(tid);
        }

        let size = self.gc.types().layout(tid).total_size();
        let obj = self.allocate_in_nursery(size)?;
        unsafe { header(obj) }.reinit(tid, 0, Revision::Initial);
        Ok(obj)
    }

    /// Word-aligned nursery allocation with collect-and-retry
    pub(crate) fn allocate_in_nursery(&mut self, size: usize) -> Result<usize> {
        match self.nursery.allocate_aligned(size) {
            Err(StmError::OutOfMemory {
                requested,
                available,
            }) if self.in_transaction() && size <= self.nursery.capacity() => {
                StmEvent::NurseryExhausted {
                    thread: self.num.0,
                    requested,
                    available,
                }
                .emit();
                self.gc.stats().record_nursery_recovery();
                self.local_collection()?;
                self.nursery.allocate_aligned(size)
            }
            other => other,
        }
    }

    // === Roots ===

    /// Push a root slot
    #[inline]
    pub fn push_root(&mut self, obj: usize) {
        self.roots.push(obj);
    }

    /// Pop the innermost root slot, with its current (possibly moved) value
    #[inline]
    pub fn pop_root(&mut self) -> Option<usize> {
        self.roots.pop()
    }

    /// Current value of root slot `index`, counted from the bottom
    #[inline]
    pub fn root(&self, index: usize) -> Option<usize> {
        self.roots.get(index)
    }

    #[inline]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    // === Teardown ===

    /// Stop the running transaction, if any, and deregister the thread
    pub fn teardown(mut self) -> Result<()> {
        if self.in_transaction() {
            self.stop_transaction()?;
        }
        Ok(())
    }
}

impl Drop for StmThread {
    fn drop(&mut self) {
        if self.in_transaction() {
            log::warn!(
                "thread {} dropped inside a transaction, aborting it",
                self.num
            );
            self.discard_transaction();
        }
        self.gc.substrate().del_tls(self.num);
        self.gc.threads().unregister(self.num);
        StmEvent::ThreadEnd { thread: self.num.0 }.emit();
    }
}

impl std::fmt::Debug for StmThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StmThread")
            .field("num", &self.num)
            .field("state", &self.state)
            .field("local_copies", &self.tldict.len())
            .field("roots", &self.roots.len())
            .field("nursery", &self.nursery)
            .finish()
    }
}
