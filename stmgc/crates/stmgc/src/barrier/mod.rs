//! Barrier Module - Mediates every access to an STM object
//!
//! A mutator never dereferences a reference it has not passed through a
//! barrier in the current transaction:
//!
//! - **Read barrier**: global references resolve to the newest revision,
//!   or to this thread's local copy of it when one exists.
//! - **Write barrier**: the first write to a global object in a
//!   transaction localizes it; the returned address is thread-private and
//!   writable until the next boundary.
//!
//! Both are idempotent within a transaction and neither ever blocks.
//!
//! ## Flag Protocol
//!
//! ```text
//! fresh local        : -
//! local copy         : LOCAL_COPY | NOT_WRITTEN      revision = BackRef(G)
//! written local copy : LOCAL_COPY                    revision = BackRef(G)
//! global             : GLOBAL | NOT_WRITTEN          revision = Initial
//! shadowed global    : GLOBAL | NOT_WRITTEN | POSSIBLY_OUTDATED
//! superseded global  : ... as above ...              revision = Forward(G')
//! ```

pub mod localize;
pub mod macros;

use crate::assert_context;
use crate::error::Result;
use crate::object::header::{header, Revision, NOT_WRITTEN, POSSIBLY_OUTDATED};
use crate::tls::StmThread;

/// Follow `Forward` links from `obj` to the newest revision
///
/// Uses Floyd's cycle detection: the promotion protocol never creates a
/// cycle, so finding one means the heap is corrupted.
///
/// # Panics
/// Panics if the forward chain starting at `obj` loops.
pub fn latest_revision(obj: usize) -> usize {
    #[inline]
    fn forward(obj: usize) -> Option<usize> {
        match unsafe { header(obj) }.revision() {
            Revision::Forward(next) => Some(next),
            _ => None,
        }
    }

    let mut slow = obj;
    let mut fast = obj;
    loop {
        fast = match forward(fast) {
            None => return fast,
            Some(next) => match forward(next) {
                None => return next,
                Some(next) => next,
            },
        };
        if let Some(next) = forward(slow) {
            slow = next;
        }
        if slow == fast {
            log::error!("cycle in forward chain of {:#x}", obj);
            panic!("cycle in forward chain starting at {:#x}", obj);
        }
    }
}

impl StmThread {
    /// Read barrier
    ///
    /// # Returns
    /// The address this thread must read `obj` through. Null maps to null.
    #[inline]
    pub fn read_barrier(&self, obj: usize) -> usize {
        if obj == 0 || !unsafe { header(obj) }.is_global() {
            return obj;
        }

        let latest = latest_revision(obj);
        if !unsafe { header(latest) }.has_flags(POSSIBLY_OUTDATED) {
            debug_assert!(
                self.tldict.lookup(latest).is_none(),
                "up-to-date global {:#x} has a local copy",
                latest
            );
            return latest;
        }
        self.tldict.lookup(latest).unwrap_or(latest)
    }

    /// Write barrier
    ///
    /// Inside a transaction the result is a local object with `NOT_WRITTEN`
    /// clear. Outside a transaction writes are non-transactional: globals
    /// resolve to their newest revision and nothing is localized.
    ///
    /// # Returns
    /// `OutOfMemory` only if a local copy cannot fit even in an empty nursery.
    ///
    /// # Panics
    /// Panics on null or on a header breaking the flag protocol.
    pub fn write_barrier(&mut self, obj: usize) -> Result<usize> {
        assert_context!(obj != 0, "write barrier on null reference");
        let h = unsafe { header(obj) };

        if !h.has_flags(NOT_WRITTEN) {
            assert_context!(
                !h.is_global() && !h.has_flags(POSSIBLY_OUTDATED),
                "written object {:#x} must be local and up to date",
                obj
            );
            return Ok(obj);
        }

        if !self.in_transaction() {
            return Ok(if h.is_global() { latest_revision(obj) } else { obj });
        }

        let (writable, original) = if h.is_global() {
            let original = latest_revision(obj);
            (self.localize(original)?, original)
        } else {
            match h.revision() {
                Revision::BackRef(original) => (obj, original),
                other => panic!(
                    "unwritten local object {:#x} has revision {:?}, expected a back reference",
                    obj, other
                ),
            }
        };

        unsafe { header(writable) }.clear_flags(NOT_WRITTEN);
        unsafe { header(original) }.set_flags(POSSIBLY_OUTDATED);
        Ok(writable)
    }
}
