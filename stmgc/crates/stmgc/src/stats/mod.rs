//! Stats Module - STM GC monitoring
//!
//! Every local collection produces a [`CollectionStats`]; the shared
//! [`StmStats`] aggregates them across threads and keeps a bounded history
//! of recent collections.
//!
//! Metrics:
//! - Collections, aborts and nursery-exhaustion recoveries
//! - Copies promoted, objects and bytes evacuated
//! - Weak references cleared and updated

pub mod collection;
pub mod timer;

pub use collection::CollectionStats;
pub use timer::Timer;

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Default number of collections kept in the history
pub const DEFAULT_HISTORY: usize = 64;

/// StmStats - statistics aggregated over all threads
pub struct StmStats {
    collections: AtomicU64,
    aborts: AtomicU64,
    nursery_recoveries: AtomicU64,
    copies_promoted: AtomicU64,
    objects_evacuated: AtomicU64,
    bytes_evacuated: AtomicUsize,
    weakrefs_cleared: AtomicU64,
    weakrefs_updated: AtomicU64,
    total_collection_ns: AtomicU64,
    max_collection_ns: AtomicU64,

    history: RwLock<VecDeque<CollectionStats>>,
    max_history: usize,
}

impl StmStats {
    pub fn new(max_history: usize) -> Self {
        Self {
            collections: AtomicU64::new(0),
            aborts: AtomicU64::new(0),
            nursery_recoveries: AtomicU64::new(0),
            copies_promoted: AtomicU64::new(0),
            objects_evacuated: AtomicU64::new(0),
            bytes_evacuated: AtomicUsize::new(0),
            weakrefs_cleared: AtomicU64::new(0),
            weakrefs_updated: AtomicU64::new(0),
            total_collection_ns: AtomicU64::new(0),
            max_collection_ns: AtomicU64::new(0),
            history: RwLock::new(VecDeque::with_capacity(max_history)),
            max_history,
        }
    }

    /// Record a finished local collection
    pub fn record_collection(&self, stats: &CollectionStats) {
        self.collections.fetch_add(1, Ordering::Relaxed);
        self.copies_promoted
            .fetch_add(stats.copies_promoted, Ordering::Relaxed);
        self.objects_evacuated
            .fetch_add(stats.objects_evacuated, Ordering::Relaxed);
        self.bytes_evacuated
            .fetch_add(stats.bytes_evacuated, Ordering::Relaxed);
        self.weakrefs_cleared
            .fetch_add(stats.weakrefs_cleared, Ordering::Relaxed);
        self.weakrefs_updated
            .fetch_add(stats.weakrefs_updated, Ordering::Relaxed);
        self.total_collection_ns
            .fetch_add(stats.duration_ns, Ordering::Relaxed);
        self.max_collection_ns
            .fetch_max(stats.duration_ns, Ordering::Relaxed);

        if self.max_history == 0 {
            return;
        }
        let mut history = self.history.write();
        if history.len() == self.max_history {
            history.pop_front();
        }
        history.push_back(stats.clone());
    }

    pub fn record_abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_nursery_recovery(&self) {
        self.nursery_recoveries.fetch_add(1, Ordering::Relaxed);
    }

    /// Recent collections, oldest first
    pub fn history(&self) -> Vec<CollectionStats> {
        self.history.read().iter().cloned().collect()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            collections: self.collections.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
            nursery_recoveries: self.nursery_recoveries.load(Ordering::Relaxed),
            copies_promoted: self.copies_promoted.load(Ordering::Relaxed),
            objects_evacuated: self.objects_evacuated.load(Ordering::Relaxed),
            bytes_evacuated: self.bytes_evacuated.load(Ordering::Relaxed),
            weakrefs_cleared: self.weakrefs_cleared.load(Ordering::Relaxed),
            weakrefs_updated: self.weakrefs_updated.load(Ordering::Relaxed),
            total_collection_ns: self.total_collection_ns.load(Ordering::Relaxed),
            max_collection_ns: self.max_collection_ns.load(Ordering::Relaxed),
        }
    }

    /// Snapshot as JSON, for dumping from tools and tests
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for StmStats {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

/// Point-in-time copy of [`StmStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub collections: u64,
    pub aborts: u64,
    pub nursery_recoveries: u64,
    pub copies_promoted: u64,
    pub objects_evacuated: u64,
    pub bytes_evacuated: usize,
    pub weakrefs_cleared: u64,
    pub weakrefs_updated: u64,
    pub total_collection_ns: u64,
    pub max_collection_ns: u64,
}
