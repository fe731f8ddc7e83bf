//! Identity - Stable ids and hashes across localization and promotion
//!
//! The identity of an object is the address of the global object it
//! started as. A local copy answers with its original's identity, and
//! promotion stores that identity in the promoted object's inline hash
//! slot, so the value never changes however many times the object is
//! copied. A fresh local object has no global address yet; asking for its
//! identity reserves one word of global space and records its address.

use crate::error::Result;
use crate::object::header::{header, Revision, WORD};
use crate::tls::StmThread;

/// Hash mangling applied on top of the identity
#[inline]
pub fn mangle(i: usize) -> usize {
    i ^ (i >> 4)
}

/// Map an address to the global object it stands for
///
/// Null stays null, a local copy maps to its original, everything else
/// (global objects, fresh local objects) maps to itself.
pub fn normalize_global(obj: usize) -> usize {
    if obj == 0 {
        return 0;
    }
    let h = unsafe { header(obj) };
    match h.revision() {
        Revision::BackRef(original) if h.is_local_copy() => original,
        _ => obj,
    }
}

/// Pointer equality modulo localization
#[inline]
pub fn ptr_eq(a: usize, b: usize) -> bool {
    normalize_global(a) == normalize_global(b)
}

impl StmThread {
    /// Identity of `obj`
    ///
    /// # Returns
    /// 0 for null. May allocate one word of global space for a fresh
    /// local object.
    pub fn identity(&self, obj: usize) -> Result<usize> {
        if obj == 0 {
            return Ok(0);
        }
        let h = unsafe { header(obj) };
        if let Some(id) = h.hash() {
            return Ok(id);
        }
        if h.is_global() {
            return Ok(obj);
        }
        if let Revision::BackRef(original) = h.revision() {
            return self.identity(original);
        }

        let id = self.gc().global_space().allocate(WORD)?;
        h.set_hash(id);
        Ok(id)
    }

    /// Identity hash: `mangle(identity(obj))`
    pub fn identity_hash(&self, obj: usize) -> Result<usize> {
        Ok(mangle(self.identity(obj)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mangle() {
        assert_eq!(mangle(0), 0);
        assert_eq!(mangle(0x10), 0x11);
        assert_eq!(mangle(0x1000), 0x1100);
    }
}
