//! Alignment Utilities
//!
//! Helper functions for word and page alignment of arena offsets.

/// Align value up to boundary
///
/// `alignment` must be a power of two.
///
/// # Examples
/// ```
/// use stmgc::util::align_up;
///
/// assert_eq!(align_up(100, 8), 104);
/// assert_eq!(align_up(64, 8), 64);
/// ```
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// Align value down to boundary
#[inline]
pub const fn align_down(value: usize, alignment: usize) -> usize {
    value & !(alignment - 1)
}

/// Check if value is aligned
#[inline]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    value & (alignment - 1) == 0
}

/// Page size assumed for arena mappings (4KB)
pub const PAGE: usize = 4096;
