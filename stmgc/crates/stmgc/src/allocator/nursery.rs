//! Nursery - Per-thread bump-pointer arena
//!
//! Objects allocated inside a transaction and local copies of global
//! objects live here. The nursery is transaction-scoped: nothing in it
//! survives a local collection by address, only by being evacuated to
//! global space first. After that the top pointer returns to the start.
//!
//! Owned by exactly one thread, so allocation is a plain add.

use crate::allocator::arena::Arena;
use crate::error::{Result, StmError};
use crate::object::header::WORD;
use crate::util::align_up;

/// Nursery - thread-private bump allocator
pub struct Nursery {
    arena: Arena,
    top: usize,
}

impl Nursery {
    /// Create nursery of `size` bytes
    pub fn new(size: usize) -> Result<Self> {
        let arena = Arena::anonymous(size)?;
        let top = arena.base();
        Ok(Self { arena, top })
    }

    /// Raw bump allocation
    ///
    /// Successive calls return adjacent ranges: the next address is the
    /// previous one plus the previous size. No alignment, no zeroing.
    ///
    /// # Returns
    /// Start address, or `OutOfMemory` when the arena is full.
    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        let new_top = self.top.checked_add(size).ok_or(StmError::OutOfMemory {
            requested: size,
            available: self.remaining(),
        })?;
        if new_top > self.arena.end() {
            return Err(StmError::OutOfMemory {
                requested: size,
                available: self.remaining(),
            });
        }

        let addr = self.top;
        self.top = new_top;
        Ok(addr)
    }

    /// Word-aligned, zero-filled allocation for objects
    pub fn allocate_aligned(&mut self, size: usize) -> Result<usize> {
        let start = align_up(self.top, WORD);
        let size = align_up(size, WORD);
        if start.checked_add(size).map_or(true, |end| end > self.arena.end()) {
            return Err(StmError::OutOfMemory {
                requested: size,
                available: self.remaining(),
            });
        }

        self.top = start + size;
        // Memory is reused after reset
        unsafe { std::ptr::write_bytes(start as *mut u8, 0, size) };
        Ok(start)
    }

    /// Drop everything allocated since the last reset
    pub fn reset(&mut self) {
        self.top = self.arena.base();
    }

    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.arena.base() && addr < self.top
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.arena.base()
    }

    /// Current allocation pointer
    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.top - self.arena.base()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.arena.end() - self.top
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.size()
    }
}

impl std::fmt::Debug for Nursery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nursery")
            .field("arena", &self.arena)
            .field("used", &self.used())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_is_exact() {
        let mut nursery = Nursery::new(4096).unwrap();
        let a1 = nursery.allocate(1).unwrap();
        let a2 = nursery.allocate(2).unwrap();
        let a3 = nursery.allocate(3).unwrap();
        let a4 = nursery.allocate(4).unwrap();
        assert_eq!(a2 - a1, 1);
        assert_eq!(a3 - a2, 2);
        assert_eq!(a4 - a3, 3);
        assert_eq!(a1, nursery.start());
    }

    #[test]
    fn test_aligned_allocation_pads_and_zeroes() {
        let mut nursery = Nursery::new(4096).unwrap();
        let raw = nursery.allocate(3).unwrap();
        unsafe { std::ptr::write_bytes(raw as *mut u8, 0xAB, 3) };

        let obj = nursery.allocate_aligned(13).unwrap();
        assert_eq!(obj % WORD, 0);
        assert_eq!(nursery.top(), obj + 16);

        nursery.reset();
        let again = nursery.allocate_aligned(8).unwrap();
        assert_eq!(again, nursery.start());
        assert_eq!(unsafe { *(again as *const u64) }, 0);
    }

    #[test]
    fn test_exhaustion() {
        let mut nursery = Nursery::new(4096).unwrap();
        assert!(nursery.allocate(4000).is_ok());
        let err = nursery.allocate(200).unwrap_err();
        assert!(matches!(err, StmError::OutOfMemory { requested: 200, available: 96 }));
        // Failed requests do not move the pointer
        assert_eq!(nursery.used(), 4000);
    }

    #[test]
    fn test_contains_tracks_top() {
        let mut nursery = Nursery::new(4096).unwrap();
        let obj = nursery.allocate_aligned(32).unwrap();
        assert!(nursery.contains(obj));
        assert!(!nursery.contains(obj + 32));
        nursery.reset();
        assert!(!nursery.contains(obj));
    }
}
