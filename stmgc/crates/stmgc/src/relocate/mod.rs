//! Relocate Module - Evacuation of the nursery at local collection
//!
//! The nursery is transaction-scoped, so everything in it that must
//! outlive the transaction is copied into global space before the nursery
//! resets. The roots of the copy are every local copy in the tldict and
//! every shadow-stack slot; from there the evacuator follows traced
//! pointer fields, rewriting each one through the forwarding table.
//!
//! Evacuation Steps:
//! 1. Copy roots, then drain the scan stack (fix pointer fields)
//! 2. Fix weak fields: evacuated target -> new address, else null
//! 3. Promote every copy to a global object; a promoted local copy takes
//!    its original's identity and the original is forwarded to it
//!
//! Pointers from global objects into a nursery never exist: globals are
//! only written outside transactions or through local copies.

pub mod forwarding;

pub use forwarding::ForwardingTable;

use crate::allocator::{GlobalSpace, Nursery};
use crate::error::Result;
use crate::object::header::{
    header, Revision, GLOBAL, HASH_FIELD, NOT_WRITTEN, VISITED,
};
use crate::object::{copy_object, read_field, write_field, TypeRegistry};
use crate::stats::CollectionStats;

/// Evacuator - copies live nursery objects to global space
pub struct Evacuator<'a> {
    nursery: &'a Nursery,
    global: &'a GlobalSpace,
    types: &'a TypeRegistry,
    forwarding: ForwardingTable,
    /// New copies whose pointer fields still need fixing
    scan: Vec<usize>,
    /// New copies that carry a weak field
    weakrefs: Vec<usize>,
    stats: CollectionStats,
}

impl<'a> Evacuator<'a> {
    pub fn new(
        nursery: &'a Nursery,
        global: &'a GlobalSpace,
        types: &'a TypeRegistry,
        thread: u32,
    ) -> Self {
        Self {
            nursery,
            global,
            types,
            forwarding: ForwardingTable::new(),
            scan: Vec::new(),
            weakrefs: Vec::new(),
            stats: CollectionStats {
                nursery_used: nursery.used(),
                ..CollectionStats::new(thread)
            },
        }
    }

    /// Copy nursery object `old` to global space, once
    ///
    /// # Returns
    /// The new address. The old header gets `VISITED`.
    pub fn evacuate(&mut self, old: usize) -> Result<usize> {
        debug_assert!(self.nursery.contains(old), "{:#x} is not in the nursery", old);
        let h = unsafe { header(old) };
        if h.has_flags(VISITED) {
            return match self.forwarding.lookup(old) {
                Some(new) => Ok(new),
                None => panic!("visited object {:#x} has no forwarding entry", old),
            };
        }

        let info = self.types.layout(h.type_id());
        let size = info.total_size();
        let new = self.global.allocate(size)?;
        unsafe { copy_object(old, new, size) };
        h.set_flags(VISITED);

        self.forwarding.add_entry(old, new);
        self.scan.push(new);
        if info.weak_offset().is_some() {
            self.weakrefs.push(new);
        }
        self.stats.objects_evacuated += 1;
        self.stats.bytes_evacuated += size;
        Ok(new)
    }

    /// Value a reference slot must hold after evacuation
    ///
    /// Nursery references are evacuated, everything else is kept.
    #[inline]
    pub fn trace_slot(&mut self, value: usize) -> Result<usize> {
        if value != 0 && self.nursery.contains(value) {
            self.evacuate(value)
        } else {
            Ok(value)
        }
    }

    /// Fix pointer fields of every copy until no new copies appear
    pub fn drain(&mut self) -> Result<()> {
        while let Some(obj) = self.scan.pop() {
            let tid = unsafe { header(obj) }.type_id();
            let types = self.types;
            for offset in types.layout(tid).pointer_offsets() {
                let value = unsafe { read_field(obj, offset) };
                let fixed = self.trace_slot(value)?;
                if fixed != value {
                    unsafe { write_field(obj, offset, fixed) };
                }
            }
        }
        Ok(())
    }

    /// Fix weak fields of evacuated weak references
    ///
    /// Must run after [`drain`](Self::drain): only then is every surviving
    /// nursery object in the forwarding table.
    pub fn process_weakrefs(&mut self) {
        debug_assert!(self.scan.is_empty());
        for &wr in &self.weakrefs {
            let tid = unsafe { header(wr) }.type_id();
            let offset = match self.types.layout(tid).weak_offset() {
                Some(offset) => offset,
                None => continue,
            };

            let target = unsafe { read_field(wr, offset) };
            if target == 0 || !self.nursery.contains(target) {
                continue;
            }
            match self.forwarding.lookup(target) {
                Some(new) => {
                    unsafe { write_field(wr, offset, new) };
                    self.stats.weakrefs_updated += 1;
                }
                None => {
                    unsafe { write_field(wr, offset, 0) };
                    self.stats.weakrefs_cleared += 1;
                }
            }
        }
    }

    /// Turn every copy into a global object
    ///
    /// A copy of a local copy is promoted over its original: it records the
    /// original's identity and the original is forwarded to it. A copy of a
    /// fresh object becomes an ordinary global, keeping any identity it
    /// already had.
    pub fn promote(&mut self) {
        for (_, new) in self.forwarding.iter() {
            let h = unsafe { header(new) };
            let tid = h.type_id();
            match h.revision() {
                Revision::BackRef(original) if h.is_local_copy() => {
                    let original_header = unsafe { header(original) };
                    let id = original_header.hash().unwrap_or(original);
                    h.reinit(tid, GLOBAL | NOT_WRITTEN, Revision::Initial);
                    h.set_hash(id);
                    original_header.set_revision(Revision::Forward(new));
                    self.stats.copies_promoted += 1;
                }
                _ => {
                    let kept = h.flags() & HASH_FIELD;
                    h.reinit(tid, GLOBAL | NOT_WRITTEN | kept, Revision::Initial);
                }
            }
        }
    }

    pub fn finish(self) -> CollectionStats {
        self.stats
    }
}
