//! Object Header - Version and ownership metadata for STM objects
//!
//! Object Header Layout (24 bytes on 64-bit):
//! ┌─────────────────────────────────────────┐
//! │      Type id and flags (8 bytes)        │  <- AtomicUsize
//! │  - Bits 0-15: Type id                   │
//! │  - Bit 16: GLOBAL                       │
//! │  - Bit 17: NOT_WRITTEN                  │
//! │  - Bit 18: POSSIBLY_OUTDATED            │
//! │  - Bit 19: LOCAL_COPY                   │
//! │  - Bit 20: VISITED                      │
//! │  - Bit 21: HASH_FIELD                   │
//! ├─────────────────────────────────────────┤
//! │         Revision (8 bytes)              │  <- tagged Initial/BackRef/Forward
//! ├─────────────────────────────────────────┤
//! │         Hash (8 bytes)                  │  <- valid only with HASH_FIELD
//! └─────────────────────────────────────────┘
//!
//! Flags of a local object are only touched by the owning thread. Flags of
//! a global object may be observed by any thread, so every word is atomic
//! and updates use release/acquire ordering.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Size of object header in bytes
pub const HEADER_SIZE: usize = 24;

/// Size of one payload slot (bytes)
pub const WORD: usize = std::mem::size_of::<usize>();

/// Type id occupies the low 16 bits of the flag word
pub const TID_MASK: usize = 0xFFFF;

/// Flag bit positions
pub const GLOBAL_BIT: usize = 16;
pub const NOT_WRITTEN_BIT: usize = 17;
pub const POSSIBLY_OUTDATED_BIT: usize = 18;
pub const LOCAL_COPY_BIT: usize = 19;
pub const VISITED_BIT: usize = 20;
pub const HASH_FIELD_BIT: usize = 21;

/// Masks for the flag word
pub const GLOBAL: usize = 1 << GLOBAL_BIT;
pub const NOT_WRITTEN: usize = 1 << NOT_WRITTEN_BIT;
pub const POSSIBLY_OUTDATED: usize = 1 << POSSIBLY_OUTDATED_BIT;
pub const LOCAL_COPY: usize = 1 << LOCAL_COPY_BIT;
pub const VISITED: usize = 1 << VISITED_BIT;
pub const HASH_FIELD: usize = 1 << HASH_FIELD_BIT;

/// Every defined flag
pub const FLAG_MASK: usize =
    GLOBAL | NOT_WRITTEN | POSSIBLY_OUTDATED | LOCAL_COPY | VISITED | HASH_FIELD;

/// Flags of an object that was born global (prebuilt or main thread)
pub const PREBUILT_FLAGS: usize = GLOBAL | NOT_WRITTEN;

const REVISION_TAG_MASK: usize = 0b11;
const BACKREF_TAG: usize = 0b01;
const FORWARD_TAG: usize = 0b10;

/// Versioning field of an object header
///
/// Exactly one meaning is active at a time:
/// - `Initial` - object has never been superseded
/// - `BackRef(addr)` - local copy of the global object at `addr`
/// - `Forward(addr)` - global object superseded by the version at `addr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Revision {
    Initial,
    BackRef(usize),
    Forward(usize),
}

impl Revision {
    /// Pack into one word. Object addresses are word aligned, so the two
    /// low bits carry the tag.
    #[inline]
    fn encode(self) -> usize {
        match self {
            Revision::Initial => 0,
            Revision::BackRef(addr) => {
                debug_assert!(addr != 0 && addr & REVISION_TAG_MASK == 0);
                addr | BACKREF_TAG
            }
            Revision::Forward(addr) => {
                debug_assert!(addr != 0 && addr & REVISION_TAG_MASK == 0);
                addr | FORWARD_TAG
            }
        }
    }

    #[inline]
    fn decode(word: usize) -> Self {
        let addr = word & !REVISION_TAG_MASK;
        match word & REVISION_TAG_MASK {
            BACKREF_TAG => Revision::BackRef(addr),
            FORWARD_TAG => Revision::Forward(addr),
            _ => Revision::Initial,
        }
    }
}

/// Object Header
///
/// Every STM-managed object starts with this header; the object's address
/// is the header's address and the payload follows at `HEADER_SIZE`.
#[repr(C)]
pub struct ObjectHeader {
    tid_and_flags: AtomicUsize,
    revision: AtomicUsize,
    hash: AtomicUsize,
}

impl ObjectHeader {
    /// Create new object header
    ///
    /// # Arguments
    /// * `tid` - Type id registered in the type registry
    /// * `flags` - Initial flag bits
    pub fn new(tid: u16, flags: usize) -> Self {
        debug_assert!(flags & !FLAG_MASK == 0, "unknown flag bits {:#x}", flags);
        Self {
            tid_and_flags: AtomicUsize::new(tid as usize | flags),
            revision: AtomicUsize::new(0),
            hash: AtomicUsize::new(0),
        }
    }

    /// Overwrite the whole header in one step.
    ///
    /// Used when an object changes role (localization, promotion) so that no
    /// intermediate flag combination is ever observed.
    #[inline]
    pub fn reinit(&self, tid: u16, flags: usize, revision: Revision) {
        self.revision.store(revision.encode(), Ordering::Release);
        self.tid_and_flags
            .store(tid as usize | flags, Ordering::Release);
        self.verify();
    }

    // === Type and Flag Operations ===

    /// Get the type id
    #[inline]
    pub fn type_id(&self) -> u16 {
        (self.tid_and_flags.load(Ordering::Relaxed) & TID_MASK) as u16
    }

    /// Get flag bits (type id stripped)
    #[inline]
    pub fn flags(&self) -> usize {
        self.tid_and_flags.load(Ordering::Acquire) & FLAG_MASK
    }

    /// Check that every bit of `mask` is set
    #[inline]
    pub fn has_flags(&self, mask: usize) -> bool {
        self.tid_and_flags.load(Ordering::Acquire) & mask == mask
    }

    /// Set flag bits
    #[inline]
    pub fn set_flags(&self, mask: usize) {
        debug_assert!(mask & !FLAG_MASK == 0);
        self.tid_and_flags.fetch_or(mask, Ordering::AcqRel);
        self.verify();
    }

    /// Clear flag bits
    #[inline]
    pub fn clear_flags(&self, mask: usize) {
        debug_assert!(mask & !FLAG_MASK == 0);
        self.tid_and_flags.fetch_and(!mask, Ordering::AcqRel);
        self.verify();
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.has_flags(GLOBAL)
    }

    #[inline]
    pub fn is_local_copy(&self) -> bool {
        self.has_flags(LOCAL_COPY)
    }

    // === Revision Operations ===

    /// Get the revision
    #[inline]
    pub fn revision(&self) -> Revision {
        Revision::decode(self.revision.load(Ordering::Acquire))
    }

    /// Set the revision
    #[inline]
    pub fn set_revision(&self, revision: Revision) {
        self.revision.store(revision.encode(), Ordering::Release);
        self.verify();
    }

    // === Hash Operations ===

    /// Get the inline identity, if one was recorded
    #[inline]
    pub fn hash(&self) -> Option<usize> {
        if self.has_flags(HASH_FIELD) {
            Some(self.hash.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Record an inline identity and set `HASH_FIELD`
    #[inline]
    pub fn set_hash(&self, value: usize) {
        self.hash.store(value, Ordering::Release);
        self.set_flags(HASH_FIELD);
    }

    /// Check flag/revision consistency (debug builds only)
    ///
    /// # Panics
    /// - `NOT_WRITTEN` clear on an object that is global or possibly outdated
    /// - `LOCAL_COPY` together with `GLOBAL`
    /// - `BackRef` without `LOCAL_COPY`, `Forward` without `GLOBAL`
    #[inline]
    pub fn verify(&self) {
        if cfg!(debug_assertions) {
            if let Err(msg) = self.check_consistency() {
                panic!("inconsistent object header {:?}: {}", self, msg);
            }
        }
    }

    /// Non-panicking form of [`verify`](Self::verify)
    pub fn check_consistency(&self) -> std::result::Result<(), &'static str> {
        let flags = self.flags();
        if flags & NOT_WRITTEN == 0 && flags & (GLOBAL | POSSIBLY_OUTDATED) != 0 {
            return Err("written object must be local and up to date");
        }
        if flags & LOCAL_COPY != 0 && flags & GLOBAL != 0 {
            return Err("local copy cannot be global");
        }
        match self.revision() {
            Revision::BackRef(_) if flags & LOCAL_COPY == 0 => {
                Err("back reference on an object that is not a local copy")
            }
            Revision::Forward(_) if flags & GLOBAL == 0 => {
                Err("forward pointer on a local object")
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for ObjectHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeader")
            .field("tid", &self.type_id())
            .field("flags", &format_args!("{:#x}", self.flags()))
            .field("revision", &self.revision())
            .finish()
    }
}

/// Get the header of the object at `obj_addr`
///
/// # Safety
/// `obj_addr` must point to a live STM object with an ObjectHeader at the start.
#[inline]
pub unsafe fn header<'a>(obj_addr: usize) -> &'a ObjectHeader {
    &*(obj_addr as *const ObjectHeader)
}

/// Get object payload start (after header)
#[inline]
pub fn payload_start(obj_addr: usize) -> usize {
    obj_addr + HEADER_SIZE
}
