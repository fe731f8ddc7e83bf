//! Transaction Lifecycle - Boundaries and local collection
//!
//! ```text
//! NoTransaction --start--> InTransaction --local_collection--> InTransaction
//!       ^                        |
//!       +---------stop-----------+   (commit = stop + start)
//!       +---------abort----------+
//! ```
//!
//! Local collection evacuates the surviving nursery objects, promotes local
//! copies over their originals, hands the audit list to the substrate,
//! clears the tldict and resets the nursery. If evacuation runs out of
//! global space nothing has been promoted yet, so the transaction is
//! aborted instead.

use crate::assert_context;
use crate::error::{Result, StmError};
use crate::logging::StmEvent;
use crate::object::header::{header, Revision, POSSIBLY_OUTDATED};
use crate::relocate::Evacuator;
use crate::stats::{CollectionStats, Timer};
use crate::tls::{LocalCopies, StmThread, TransactionState};
use std::sync::Arc;

impl StmThread {
    /// Begin an inevitable transaction
    ///
    /// # Returns
    /// - `NotTransactional` on the main thread
    /// - `InvalidState` if a transaction is already running
    pub fn start_transaction(&mut self) -> Result<()> {
        if self.num().is_main() {
            return Err(StmError::NotTransactional {
                thread: self.num().0,
            });
        }
        if self.in_transaction() {
            return Err(StmError::InvalidState {
                expected: "NoTransaction".to_string(),
                actual: "InTransaction".to_string(),
            });
        }
        assert_context!(
            self.tldict.is_empty() && self.transactional_copies.is_empty(),
            "thread {} starts a transaction with {} stale local copies",
            self.num(),
            self.tldict.len()
        );

        self.gc().substrate().begin_inevitable_transaction(self.num());
        self.state = TransactionState::InTransaction;
        StmEvent::TransactionStart {
            thread: self.num().0,
        }
        .emit();
        Ok(())
    }

    /// Run a local collection and leave the thread outside a transaction
    pub fn stop_transaction(&mut self) -> Result<CollectionStats> {
        self.expect_transaction()?;
        let stats = self.collect()?;
        self.state = TransactionState::NoTransaction;
        StmEvent::TransactionStop {
            thread: self.num().0,
        }
        .emit();
        Ok(stats)
    }

    /// Stop the transaction and immediately start the next one
    pub fn commit_transaction(&mut self) -> Result<CollectionStats> {
        let stats = self.stop_transaction()?;
        self.start_transaction()?;
        Ok(stats)
    }

    /// Transaction boundary without leaving transactional mode
    ///
    /// Promotes all local copies, then begins a new substrate transaction.
    pub fn local_collection(&mut self) -> Result<CollectionStats> {
        self.expect_transaction()?;
        let stats = self.collect()?;
        self.gc().substrate().begin_inevitable_transaction(self.num());
        Ok(stats)
    }

    /// Discard the running transaction without promoting anything
    ///
    /// Local copies and fresh objects are dropped with the nursery; root
    /// slots that pointed into it are nulled.
    pub fn abort_transaction(&mut self) -> Result<()> {
        self.expect_transaction()?;
        self.discard_transaction();
        Ok(())
    }

    pub(crate) fn discard_transaction(&mut self) {
        self.gc().substrate().abort_transaction(self.num());

        let copies_discarded = self.tldict.len();
        self.tldict.clear();
        self.transactional_copies.clear();
        for slot in self.roots.slots_mut() {
            if self.nursery.contains(*slot) {
                *slot = 0;
            }
        }
        self.nursery.reset();
        self.state = TransactionState::NoTransaction;

        self.gc().stats().record_abort();
        StmEvent::TransactionAbort {
            thread: self.num().0,
            copies_discarded,
        }
        .emit();
    }

    fn expect_transaction(&self) -> Result<()> {
        if self.in_transaction() {
            Ok(())
        } else {
            Err(StmError::InvalidState {
                expected: "InTransaction".to_string(),
                actual: "NoTransaction".to_string(),
            })
        }
    }

    /// Reconcile the nursery, then commit the substrate transaction
    ///
    /// # Returns
    /// `OutOfMemory` if global space cannot take the survivors; the
    /// transaction is then aborted and nursery roots are nulled.
    fn collect(&mut self) -> Result<CollectionStats> {
        let timer = Timer::start();
        let gc = Arc::clone(self.gc());
        let saved_roots = self.roots.slots_mut().to_vec();

        let mut evacuator =
            Evacuator::new(&self.nursery, gc.global_space(), gc.types(), self.num().0);
        if let Err(err) = evacuate_survivors(&mut evacuator, &self.tldict, self.roots.slots_mut())
        {
            drop(evacuator);
            log::warn!(
                "thread {} cannot evacuate its nursery, aborting: {}",
                self.num(),
                err
            );
            self.roots.slots_mut().copy_from_slice(&saved_roots);
            self.discard_transaction();
            return Err(err);
        }
        evacuator.process_weakrefs();
        evacuator.promote();

        let mut stats = evacuator.finish();
        gc.substrate()
            .commit_transaction(self.num(), &self.transactional_copies);
        if gc.config().verify_invariants {
            self.verify_after_collection();
        }

        self.tldict.clear();
        self.transactional_copies.clear();
        self.nursery.reset();

        stats.duration_ns = timer.elapsed_ns();
        gc.stats().record_collection(&stats);
        StmEvent::Collection { stats: &stats }.emit();
        Ok(stats)
    }

    /// Every tldict original now forwards to a global and no root still
    /// points into the nursery
    fn verify_after_collection(&self) {
        for (original, _) in self.tldict.iter() {
            match unsafe { header(original) }.revision() {
                Revision::Forward(new) => assert_context!(
                    unsafe { header(new) }.is_global(),
                    "promoted copy {:#x} is not global",
                    new
                ),
                other => panic!(
                    "original {:#x} not forwarded after collection: {:?}",
                    original, other
                ),
            }
        }
        for index in 0..self.roots.len() {
            if let Some(slot) = self.roots.get(index) {
                assert_context!(
                    !self.nursery.contains(slot),
                    "root {} still points into the nursery at {:#x}",
                    index,
                    slot
                );
            }
        }
    }
}

/// Evacuate every local copy and root target, then everything they reach
fn evacuate_survivors(
    evacuator: &mut Evacuator<'_>,
    tldict: &LocalCopies,
    roots: &mut [usize],
) -> Result<()> {
    for (original, copy) in tldict.iter() {
        let h = unsafe { header(copy) };
        assert_context!(
            h.is_local_copy() && !h.is_global() && h.revision() == Revision::BackRef(original),
            "tldict entry {:#x} -> {:#x} is not a genuine local copy: {:?}",
            original,
            copy,
            h
        );
        assert_context!(
            unsafe { header(original) }.has_flags(POSSIBLY_OUTDATED),
            "localized global {:#x} is not marked possibly outdated",
            original
        );
        evacuator.evacuate(copy)?;
    }
    for slot in roots.iter_mut() {
        *slot = evacuator.trace_slot(*slot)?;
    }
    evacuator.drain()
}
