//! Object Module - STM object model
//!
//! An object is a header followed by a payload of words. Objects are
//! named by raw addresses; field offsets are byte offsets into the payload.

pub mod header;
pub mod identity;
pub mod layout;
pub mod weak;

pub use header::{header, payload_start, ObjectHeader, Revision, HEADER_SIZE, WORD};
pub use identity::{mangle, normalize_global, ptr_eq};
pub use layout::{PointerMap, TypeInfo, TypeRegistry};

/// Read a payload word
///
/// # Safety
/// `obj` must be a live object whose payload covers `offset..offset + WORD`.
#[inline]
pub unsafe fn read_field(obj: usize, offset: usize) -> usize {
    std::ptr::read((payload_start(obj) + offset) as *const usize)
}

/// Write a payload word
///
/// # Safety
/// Same as [`read_field`]; additionally the caller must own write access,
/// i.e. `obj` came out of the write barrier.
#[inline]
pub unsafe fn write_field(obj: usize, offset: usize, value: usize) {
    std::ptr::write((payload_start(obj) + offset) as *mut usize, value)
}

/// Copy a whole object, header included
///
/// # Safety
/// Both ranges must be valid for `size` bytes and must not overlap.
#[inline]
pub(crate) unsafe fn copy_object(src: usize, dst: usize, size: usize) {
    std::ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, size)
}
