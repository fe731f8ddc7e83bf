//! Global Space - Shared storage for global objects
//!
//! Prebuilt objects, main-thread allocations and objects promoted by local
//! collection live here. Allocation bumps through fixed-size chunks under a
//! mutex; an object larger than half a chunk gets a dedicated mapping so
//! the current chunk is not wasted.
//!
//! Global space is never compacted or swept: tracing collection of shared
//! objects is outside this crate.

use crate::allocator::arena::Arena;
use crate::error::{Result, StmError};
use crate::object::header::WORD;
use crate::util::align_up;
use parking_lot::Mutex;

/// GlobalSpace - chunked bump allocator shared by all threads
pub struct GlobalSpace {
    chunk_size: usize,
    limit: Option<usize>,
    inner: Mutex<Chunks>,
}

struct Chunks {
    chunks: Vec<Arena>,
    large: Vec<Arena>,
    top: usize,
    end: usize,
    bytes_allocated: usize,
}

impl GlobalSpace {
    /// Create global space; the first chunk is mapped lazily
    pub fn new(chunk_size: usize) -> Self {
        Self::with_limit(chunk_size, None)
    }

    /// Global space refusing to hand out more than `limit` bytes in total
    pub fn with_limit(chunk_size: usize, limit: Option<usize>) -> Self {
        Self {
            chunk_size,
            limit,
            inner: Mutex::new(Chunks {
                chunks: Vec::new(),
                large: Vec::new(),
                top: 0,
                end: 0,
                bytes_allocated: 0,
            }),
        }
    }

    /// Allocate `size` bytes, word aligned and zero-filled
    ///
    /// Zero-filled because chunks are fresh mappings that are never reused.
    pub fn allocate(&self, size: usize) -> Result<usize> {
        if size == 0 {
            return Err(StmError::InvalidArgument(
                "global allocation of 0 bytes".to_string(),
            ));
        }
        let size = align_up(size, WORD);
        let mut inner = self.inner.lock();

        if let Some(limit) = self.limit {
            let available = limit.saturating_sub(inner.bytes_allocated);
            if size > available {
                return Err(StmError::OutOfMemory {
                    requested: size,
                    available,
                });
            }
        }

        if size > self.chunk_size / 2 {
            let arena = Arena::anonymous(size)?;
            let addr = arena.base();
            inner.large.push(arena);
            inner.bytes_allocated += size;
            log::debug!("global space: dedicated mapping of {} bytes at {:#x}", size, addr);
            return Ok(addr);
        }

        if inner.end - inner.top < size {
            let chunk = Arena::anonymous(self.chunk_size)?;
            inner.top = chunk.base();
            inner.end = chunk.end();
            inner.chunks.push(chunk);
            log::debug!("global space: chunk {} mapped", inner.chunks.len());
        }

        let addr = inner.top;
        inner.top += size;
        inner.bytes_allocated += size;
        Ok(addr)
    }

    /// Check whether `addr` lies in memory owned by global space
    pub fn contains(&self, addr: usize) -> bool {
        let inner = self.inner.lock();
        inner.chunks.iter().any(|c| c.contains(addr)) || inner.large.iter().any(|c| c.contains(addr))
    }

    pub fn bytes_allocated(&self) -> usize {
        self.inner.lock().bytes_allocated
    }

    /// Number of mappings (chunks plus dedicated large mappings)
    pub fn mapping_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.chunks.len() + inner.large.len()
    }
}
