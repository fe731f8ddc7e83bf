//! Localization - Thread-private copies of global objects
//!
//! `localize(R)` returns this thread's local copy of the global object
//! `R`, duplicating it into the nursery on first use in a transaction.
//! Duplication copies the payload verbatim: pointer fields of the copy
//! still point wherever the original's did.

use crate::assert_context;
use crate::error::Result;
use crate::logging::StmEvent;
use crate::object::header::{
    header, payload_start, Revision, HEADER_SIZE, LOCAL_COPY, NOT_WRITTEN, POSSIBLY_OUTDATED,
};
use crate::tls::{StmThread, TransactionalCopy};

impl StmThread {
    /// Local copy of global `original`, created on first call
    ///
    /// A fresh copy has `LOCAL_COPY | NOT_WRITTEN`, revision
    /// `BackRef(original)`, is recorded in the tldict and appended to the
    /// audit list of transactional copies. The original is marked
    /// `POSSIBLY_OUTDATED` so the read barrier consults the tldict for it.
    pub fn localize(&mut self, original: usize) -> Result<usize> {
        if let Some(copy) = self.tldict.lookup(original) {
            assert_context!(
                unsafe { header(original) }.has_flags(POSSIBLY_OUTDATED),
                "global {:#x} has a local copy but is not marked possibly outdated",
                original
            );
            return Ok(copy);
        }

        let copy = self.duplicate(original)?;
        self.tldict.add(original, copy);
        unsafe { header(original) }.set_flags(POSSIBLY_OUTDATED);
        self.transactional_copies
            .push(TransactionalCopy { original, copy });
        StmEvent::Localize {
            thread: self.num().0,
            original,
            copy,
        }
        .emit();
        Ok(copy)
    }

    /// Structural copy of `original` into the nursery
    fn duplicate(&mut self, original: usize) -> Result<usize> {
        let src = unsafe { header(original) };
        assert_context!(
            src.is_global(),
            "only global objects are duplicated, got {:?}",
            src
        );
        let tid = src.type_id();
        let size = self.gc().types().layout(tid).total_size();

        let copy = self.allocate_in_nursery(size)?;
        unsafe {
            std::ptr::copy_nonoverlapping(
                payload_start(original) as *const u8,
                payload_start(copy) as *mut u8,
                size - HEADER_SIZE,
            );
            header(copy).reinit(tid, LOCAL_COPY | NOT_WRITTEN, Revision::BackRef(original));
        }
        Ok(copy)
    }
}
