//! Arena - Anonymous memory mapping backing the nursery and global space
//!
//! Memory comes from the OS zero-filled. Arenas are never remapped, so an
//! address handed out stays valid until the arena is dropped.

use crate::error::{Result, StmError};
use crate::util::{align_up, PAGE};
use memmap2::{MmapMut, MmapOptions};

/// Anonymous read/write mapping
pub struct Arena {
    /// Keeps the mapping alive; all access goes through raw addresses
    _mmap: MmapMut,
    base: usize,
    size: usize,
}

impl Arena {
    /// Create anonymous mapping
    ///
    /// # Arguments
    /// * `size` - Size in bytes (rounded up to page boundary)
    pub fn anonymous(size: usize) -> Result<Self> {
        let size = align_up(size.max(1), PAGE);

        let mut mmap = MmapOptions::new().len(size).map_anon().map_err(|e| {
            StmError::VirtualMemory(format!("failed to map {} bytes: {}", size, e))
        })?;
        let base = mmap.as_mut_ptr() as usize;

        Ok(Self {
            _mmap: mmap,
            base,
            size,
        })
    }

    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.base + self.size
    }

    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr < self.end()
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Arena({:#x}..{:#x})", self.base, self.end())
    }
}
