//! Collection Statistics - What one local collection did

use serde::{Deserialize, Serialize};

/// Statistics of a single local collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Thread that ran the collection
    pub thread: u32,

    /// Local copies promoted over their global originals
    pub copies_promoted: u64,

    /// Nursery objects copied to global space (copies and fresh objects)
    pub objects_evacuated: u64,
    pub bytes_evacuated: usize,

    /// Weak fields whose target died
    pub weakrefs_cleared: u64,
    /// Weak fields rewritten to an evacuated target
    pub weakrefs_updated: u64,

    /// Nursery bytes in use when the collection started
    pub nursery_used: usize,

    pub duration_ns: u64,
}

impl CollectionStats {
    pub fn new(thread: u32) -> Self {
        Self {
            thread,
            ..Default::default()
        }
    }

    /// Fresh objects that were reachable (evacuated minus promoted copies)
    pub fn fresh_objects_evacuated(&self) -> u64 {
        self.objects_evacuated.saturating_sub(self.copies_promoted)
    }

    /// Fraction of the used nursery that survived
    pub fn survival_ratio(&self) -> f64 {
        if self.nursery_used == 0 {
            0.0
        } else {
            self.bytes_evacuated as f64 / self.nursery_used as f64
        }
    }
}
