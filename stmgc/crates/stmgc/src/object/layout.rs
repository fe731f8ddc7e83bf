//! Type Layouts - Where pointer fields live inside each object type
//!
//! Every object carries a 16-bit type id in its header. The registry maps
//! that id to a [`TypeInfo`]: payload size, which payload words hold traced
//! GC pointers, and at most one untraced weak field.
//!
//! Offsets are byte offsets into the payload (after the header) and must be
//! word aligned. Each bit of the pointer map stands for one payload word.
//!
//! # Example
//!
//! ```rust
//! use stmgc::object::{TypeInfo, TypeRegistry};
//!
//! let mut types = TypeRegistry::new();
//! // struct SR { s1: *S, sr2: *SR, sr3: *SR }
//! types.register(2, TypeInfo::new("SR", 24).with_pointers(&[0, 8, 16])).unwrap();
//! assert_eq!(types.layout(2).pointer_offsets().count(), 3);
//! ```

use crate::error::{Result, StmError};
use crate::object::header::{HEADER_SIZE, WORD};
use crate::util::align_up;
use indexmap::IndexMap;

/// Maximum number of traced pointer slots per type (64-bit map)
pub const MAX_POINTER_SLOTS: usize = 64;

/// Pointer map over payload words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerMap {
    bitmap: u64,
}

impl PointerMap {
    /// Build from byte offsets
    ///
    /// # Panics
    /// Panics on an unaligned offset or one past the 64-slot capacity.
    pub fn new(offsets: &[usize]) -> Self {
        let mut bitmap = 0u64;
        for &offset in offsets {
            assert!(
                offset % WORD == 0,
                "pointer offset {} is not word aligned",
                offset
            );
            let slot = offset / WORD;
            assert!(
                slot < MAX_POINTER_SLOTS,
                "pointer offset {} exceeds the pointer map",
                offset
            );
            bitmap |= 1u64 << slot;
        }
        Self { bitmap }
    }

    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset % WORD == 0
            && offset / WORD < MAX_POINTER_SLOTS
            && self.bitmap & (1u64 << (offset / WORD)) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bitmap == 0
    }

    /// Iterate over byte offsets, lowest first
    pub fn offsets(&self) -> impl Iterator<Item = usize> {
        let bitmap = self.bitmap;
        (0..MAX_POINTER_SLOTS)
            .filter(move |slot| bitmap & (1u64 << slot) != 0)
            .map(|slot| slot * WORD)
    }
}

/// Layout of one object type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    name: &'static str,
    payload_size: usize,
    pointers: PointerMap,
    weak_offset: Option<usize>,
}

impl TypeInfo {
    /// Type with `payload_size` bytes and no pointer fields
    pub fn new(name: &'static str, payload_size: usize) -> Self {
        Self {
            name,
            payload_size,
            pointers: PointerMap::default(),
            weak_offset: None,
        }
    }

    /// Declare traced pointer fields
    pub fn with_pointers(mut self, offsets: &[usize]) -> Self {
        self.pointers = PointerMap::new(offsets);
        self
    }

    /// Declare the weak field. A weak field is never traced.
    pub fn with_weak(mut self, offset: usize) -> Self {
        assert!(offset % WORD == 0, "weak offset {} is not word aligned", offset);
        self.weak_offset = Some(offset);
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Header plus payload, rounded to the word size
    #[inline]
    pub fn total_size(&self) -> usize {
        align_up(HEADER_SIZE + self.payload_size, WORD)
    }

    #[inline]
    pub fn pointer_offsets(&self) -> impl Iterator<Item = usize> {
        self.pointers.offsets()
    }

    #[inline]
    pub fn weak_offset(&self) -> Option<usize> {
        self.weak_offset
    }

    fn validate(&self) -> Result<()> {
        let words = align_up(self.payload_size, WORD);
        if let Some(last) = self.pointers.offsets().last() {
            if last + WORD > words {
                return Err(StmError::InvalidArgument(format!(
                    "type {}: pointer offset {} outside payload of {} bytes",
                    self.name, last, self.payload_size
                )));
            }
        }
        if let Some(weak) = self.weak_offset {
            if weak + WORD > words || self.pointers.contains(weak) {
                return Err(StmError::InvalidArgument(format!(
                    "type {}: weak offset {} overlaps payload bounds or a traced field",
                    self.name, weak
                )));
            }
        }
        Ok(())
    }
}

/// Registry of object layouts, keyed by type id
///
/// Built before the collector starts and read-only afterwards, so lookups
/// need no locking.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<u16, TypeInfo>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layout under `tid`
    ///
    /// # Returns
    /// `InvalidArgument` if `tid` is taken or the layout is malformed.
    pub fn register(&mut self, tid: u16, info: TypeInfo) -> Result<()> {
        info.validate()?;
        if self.types.contains_key(&tid) {
            return Err(StmError::InvalidArgument(format!(
                "type id {} registered twice",
                tid
            )));
        }
        self.types.insert(tid, info);
        Ok(())
    }

    /// Layout of `tid`
    ///
    /// # Panics
    /// An unknown type id means a corrupted header or a caller bug; either
    /// way it is fatal.
    #[inline]
    pub fn layout(&self, tid: u16) -> &TypeInfo {
        match self.types.get(&tid) {
            Some(info) => info,
            None => {
                log::error!("unknown type id {} in object header", tid);
                panic!("unknown type id {}", tid);
            }
        }
    }

    #[inline]
    pub fn get(&self, tid: u16) -> Option<&TypeInfo> {
        self.types.get(&tid)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_map() {
        let map = PointerMap::new(&[0, 16]);
        assert!(map.contains(0));
        assert!(!map.contains(8));
        assert!(map.contains(16));
        assert!(!map.contains(4));
        assert_eq!(map.offsets().collect::<Vec<_>>(), vec![0, 16]);
    }

    #[test]
    #[should_panic(expected = "not word aligned")]
    fn test_unaligned_pointer_panics() {
        PointerMap::new(&[3]);
    }

    #[test]
    fn test_total_size_rounds_to_word() {
        let info = TypeInfo::new("odd", 13);
        assert_eq!(info.name(), "odd");
        assert_eq!(info.payload_size(), 13);
        assert_eq!(info.total_size(), HEADER_SIZE + 16);
    }

    #[test]
    fn test_register_rejects_duplicates_and_bad_layouts() {
        let mut types = TypeRegistry::new();
        types.register(1, TypeInfo::new("S", 24)).unwrap();
        assert!(types.register(1, TypeInfo::new("S2", 8)).is_err());

        let bad = TypeInfo::new("bad", 8).with_pointers(&[8]);
        assert!(types.register(2, bad).is_err());

        let overlap = TypeInfo::new("overlap", 16).with_pointers(&[0]).with_weak(0);
        assert!(types.register(3, overlap).is_err());

        assert_eq!(types.len(), 1);
    }

    #[test]
    #[should_panic(expected = "unknown type id 99")]
    fn test_unknown_type_is_fatal() {
        TypeRegistry::new().layout(99);
    }
}
