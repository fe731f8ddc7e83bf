//! Allocator Module - Memory for STM objects
//!
//! ## Allocation Spaces
//!
//! - **Nursery**: per-thread bump arena, reset at every local collection
//! - **Global space**: shared chunks for global objects, never reused
//!
//! Both are carved from anonymous mappings ([`Arena`]).

pub mod arena;
pub mod global;
pub mod nursery;

pub use arena::Arena;
pub use global::GlobalSpace;
pub use nursery::Nursery;
