//! Error Module - STM GC Error Types
//!
//! Defines the recoverable error conditions of the STM GC.
//!
//! # Error Categories
//!
//! ## Memory Errors
//! - `OutOfMemory` - Nursery or global space exhausted
//! - `VirtualMemory` - Anonymous mapping of an arena failed
//!
//! ## Transaction Errors
//! - `Deadlock` - Atomic transaction tried to block on a held lock
//! - `NotTransactional` - Transaction requested on the main thread
//! - `InvalidState` - Lifecycle call out of order
//! - `LockNotHeld` - Release of a lock nobody holds
//!
//! ## Configuration Errors
//! - `Configuration` - Invalid configuration
//! - `InvalidArgument` - Invalid function argument
//!
//! Protocol invariant violations are not represented here: they are bugs
//! and abort through `panic!`.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for all STM GC operations
///
/// # Examples
///
/// ```rust
/// use stmgc::StmError;
///
/// fn handle_error(err: StmError) {
///     match err {
///         StmError::OutOfMemory { requested, available } => {
///             eprintln!("OOM: requested {}, available {}", requested, available);
///         }
///         StmError::Deadlock(msg) => {
///             eprintln!("deadlock avoided: {}", msg);
///         }
///         _ => {
///             eprintln!("Other error: {}", err);
///         }
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum StmError {
    /// Out of memory - arena exhaustion
    ///
    /// **When returned:** Request does not fit in the nursery even after a
    /// local collection, or the raw bump allocator is full.
    ///
    /// **Recovery strategy:** Commit the transaction or allocate less
    #[error("Out of memory: requested {requested} bytes, available {available} bytes")]
    OutOfMemory { requested: usize, available: usize },

    /// Virtual memory error
    ///
    /// **When returned:** Anonymous mapping for a nursery or global chunk failed
    ///
    /// **Recovery strategy:** Cannot recover - terminate gracefully
    #[error("Virtual memory error: {0}")]
    VirtualMemory(String),

    /// Deadlock avoided
    ///
    /// **When returned:** A thread inside an atomic transaction asked to
    /// block on a lock that is already held
    ///
    /// **Recovery strategy:** Leave the atomic section before acquiring
    #[error("deadlock: {0}")]
    Deadlock(String),

    /// Lock released while not held
    #[error("Lock released while not held")]
    LockNotHeld,

    /// Thread cannot run transactions
    ///
    /// **When returned:** `start_transaction` on the main thread (id 0)
    #[error("Thread {thread} does not run transactions")]
    NotTransactional { thread: u32 },

    /// Invalid state
    ///
    /// **When returned:** Transaction lifecycle call out of order
    ///
    /// **Example scenario:** `stop_transaction` on a thread with no transaction
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Invalid argument
    ///
    /// **When returned:** Function argument fails validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    ///
    /// **When returned:** `StmConfig::validate` rejected the configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl StmError {
    /// Check if this error is recoverable by the caller
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StmError::OutOfMemory { .. } | StmError::Deadlock(_)
        )
    }

    /// Check if this error indicates misuse of the protocol API
    pub fn is_bug(&self) -> bool {
        matches!(
            self,
            StmError::InvalidState { .. } | StmError::LockNotHeld
        )
    }
}

/// Result type alias for STM GC operations
pub type Result<T> = std::result::Result<T, StmError>;

/// Assertion with context, used for protocol invariants.
///
/// A failed invariant is a bug in the caller or in the protocol itself and
/// aborts instead of returning an error.
#[macro_export]
macro_rules! assert_context {
    ($cond:expr, $context:expr) => {
        if !$cond {
            panic!("Assertion failed at {}: {}", stringify!($cond), $context);
        }
    };
    ($cond:expr, $context:expr, $($arg:tt)*) => {
        if !$cond {
            panic!("Assertion failed at {}: {}", stringify!($cond), format!($context, $($arg)*));
        }
    };
}
