//! STM Event Logging
//!
//! Structured events for transaction boundaries and collections, routed to
//! the `log` facade. The library never installs a logger; binaries and
//! tests pick one.
//!
//! Log Levels:
//! - WARN: Nursery exhaustion recovery, teardown inside a transaction
//! - DEBUG: Transaction boundaries, collections, aborts
//! - TRACE: Per-object operations (localization)

use crate::stats::CollectionStats;
use log::Level;
use std::fmt;

/// STM event types
#[derive(Debug, Clone)]
pub enum StmEvent<'a> {
    /// Thread registered with the collector
    ThreadStart { thread: u32 },

    /// Thread deregistered
    ThreadEnd { thread: u32 },

    /// Inevitable transaction started
    TransactionStart { thread: u32 },

    /// Transaction left without starting a new one
    TransactionStop { thread: u32 },

    /// Transaction discarded without promotion
    TransactionAbort {
        thread: u32,
        copies_discarded: usize,
    },

    /// Local collection finished
    Collection { stats: &'a CollectionStats },

    /// A global object got a thread-local copy
    Localize {
        thread: u32,
        original: usize,
        copy: usize,
    },

    /// Nursery was full and a collection ran to make room
    NurseryExhausted {
        thread: u32,
        requested: usize,
        available: usize,
    },
}

impl StmEvent<'_> {
    /// Log level for event
    pub fn level(&self) -> Level {
        match self {
            StmEvent::NurseryExhausted { .. } => Level::Warn,
            StmEvent::Localize { .. } => Level::Trace,
            _ => Level::Debug,
        }
    }

    /// Send the event to the installed logger
    #[inline]
    pub fn emit(&self) {
        let level = self.level();
        if log::log_enabled!(target: "stmgc", level) {
            log::log!(target: "stmgc", level, "{}", self);
        }
    }
}

impl fmt::Display for StmEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StmEvent::ThreadStart { thread } => write!(f, "[STM] thread {} registered", thread),
            StmEvent::ThreadEnd { thread } => write!(f, "[STM] thread {} deregistered", thread),
            StmEvent::TransactionStart { thread } => {
                write!(f, "[STM] thread {}: transaction started", thread)
            }
            StmEvent::TransactionStop { thread } => {
                write!(f, "[STM] thread {}: transaction stopped", thread)
            }
            StmEvent::TransactionAbort {
                thread,
                copies_discarded,
            } => write!(
                f,
                "[STM] thread {}: transaction aborted, {} local copies discarded",
                thread, copies_discarded
            ),
            StmEvent::Collection { stats } => write!(
                f,
                "[STM] thread {}: local collection promoted {} copies, evacuated {} objects ({} bytes), weakrefs {} cleared / {} updated in {}us",
                stats.thread,
                stats.copies_promoted,
                stats.objects_evacuated,
                stats.bytes_evacuated,
                stats.weakrefs_cleared,
                stats.weakrefs_updated,
                stats.duration_ns / 1000
            ),
            StmEvent::Localize {
                thread,
                original,
                copy,
            } => write!(
                f,
                "[STM] thread {}: localized {:#x} -> {:#x}",
                thread, original, copy
            ),
            StmEvent::NurseryExhausted {
                thread,
                requested,
                available,
            } => write!(
                f,
                "[STM] thread {}: nursery exhausted ({} requested, {} available), collecting",
                thread, requested, available
            ),
        }
    }
}
