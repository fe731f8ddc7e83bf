//! # stmgc - Object versioning and barriers for an STM-emulating GC
//!
//! stmgc lets several threads mutate a shared object graph without a global
//! lock. On its first write to a shared (global) object inside a
//! transaction, a thread receives a private local copy; at the transaction
//! boundary the thread's copies are promoted back to shared status by a
//! *local collection*.
//!
//! ## Overview
//!
//! - **Object header**: type id, flag bits and a tagged revision
//!   (`Initial`, `BackRef`, `Forward`) on every object
//! - **Nursery**: per-thread bump arena for transactional allocation
//! - **tldict**: per-thread map from global objects to local copies
//! - **Barriers**: read and write barriers mediating every access
//! - **Local collection**: evacuation of the nursery and promotion of copies
//! - **Identity**: ids and hashes that survive localization and promotion
//!
//! Conflict detection and the real atomic commit belong to the substrate
//! behind [`substrate::StmOperations`]; [`substrate::EmulatedStm`] stands in
//! for it in-process.
//!
//! ## Quick Start
//!
//! ```rust
//! use stmgc::object::{read_field, write_field, TypeInfo, TypeRegistry};
//! use stmgc::{StmConfig, StmGc};
//!
//! fn main() -> stmgc::Result<()> {
//!     let mut types = TypeRegistry::new();
//!     types.register(1, TypeInfo::new("S", 24))?;
//!     let gc = StmGc::emulated(StmConfig::default(), types)?;
//!
//!     // Shared object, written before any transaction runs
//!     let s = gc.allocate_global(1)?;
//!     unsafe { write_field(s, 0, 12) };
//!
//!     let mut thread = gc.worker_thread()?;
//!     thread.start_transaction()?;
//!     let t = thread.write_barrier(s)?;
//!     assert_ne!(t, s);
//!     unsafe { write_field(t, 0, 13) };
//!     thread.stop_transaction()?;
//!
//!     // The promoted copy is now the newest revision of `s`
//!     let latest = thread.read_barrier(s);
//!     assert_eq!(unsafe { read_field(latest, 0) }, 13);
//!     Ok(())
//! }
//! ```
//!
//! ## Object Life Cycle
//!
//! ```text
//!  prebuilt / main thread        worker, in transaction
//!           │                            │
//!           ▼                            ▼
//!     ┌──────────┐  write barrier  ┌────────────┐
//!     │  global  │ ──────────────► │ local copy │
//!     └──────────┘                 └────────────┘
//!        ▲   │ Forward                   │ local collection
//!        │   └───────────────────────────┤ (evacuate + promote)
//!        │                               ▼
//!        │                        ┌──────────────┐
//!        └─────────────────────── │ new revision │
//!                                 └──────────────┘
//! ```
//!
//! ## Safety
//!
//! Objects are named by raw addresses. Users must follow these rules:
//!
//! 1. **Pass every reference through a barrier** in the current transaction
//!    before reading (read barrier) or writing (write barrier) it
//! 2. **Root nursery references** across anything that may collect: local
//!    collection, transaction boundaries, and allocation (which collects
//!    when the nursery is full)
//! 3. **Never share a local object** with another thread
//!
//! ### Thread Safety
//!
//! - `StmGc` is `Send + Sync` and shared through `Arc`
//! - `StmThread` is owned by one thread and used through `&mut self`
//!
//! ## Modules
//!
//! - [`allocator`]: Nursery arenas and global space
//! - [`barrier`]: Read/write barriers, localization, forward-chain chasing
//! - [`config`]: Configuration parameters and validation
//! - [`error`]: Error types
//! - [`gc`]: Shared collector state
//! - [`object`]: Header, type layouts, identity, weak references
//! - [`relocate`]: Nursery evacuation at local collection
//! - [`runtime`]: Check interval, STM lock, external-call hooks
//! - [`stats`]: Collection statistics
//! - [`substrate`]: Interface to the transactional substrate
//! - [`tls`]: Per-thread state, tldict, roots, thread registry

// Core modules
pub mod config;
pub mod error;
pub mod gc;
pub mod transaction;

// Object model and memory
pub mod allocator;
pub mod object;
pub mod relocate;

// Protocol
pub mod barrier;
pub mod substrate;
pub mod tls;

// Runtime and monitoring
pub mod logging;
pub mod runtime;
pub mod stats;

// Utilities
pub mod util;

// Re-export main types for convenience
pub use barrier::latest_revision;
pub use config::{ConfigError, StmConfig};
pub use error::{Result, StmError};
pub use gc::StmGc;
pub use object::{mangle, normalize_global, ptr_eq, Revision, TypeInfo, TypeRegistry};
pub use runtime::{StmLock, StmThreadLocals};
pub use stats::{CollectionStats, StmStats};
pub use substrate::{EmulatedStm, StmOperations};
pub use tls::{StmThread, ThreadNum, TransactionState, TransactionalCopy};

/// stmgc version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
