//! Util Module - Shared Utilities

pub mod alignment;

pub use alignment::{align_down, align_up, is_aligned, PAGE};
