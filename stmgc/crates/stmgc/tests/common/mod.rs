//! Test Utilities for the stmgc Test Suite
//!
//! Shared object types and a fixture wiring a collector to an
//! [`EmulatedStm`] the tests can inspect.
//!
//! ============================================================================
//! Object types used throughout (payload offsets in bytes)
//!
//!   S   (tid 1)   { a, b, c }            no pointers
//!   SR  (tid 2)   { s1, sr2, sr3 }       all traced
//!   SWR (tid 3)   { wr }                 traced, points to a WR
//!   WR  (tid 124) { wadr }               weak
//! ============================================================================

#![allow(dead_code)]

use stmgc::object::header::header;
use stmgc::object::{read_field, write_field, TypeInfo, TypeRegistry};
use stmgc::{EmulatedStm, Revision, StmConfig, StmGc, StmThread};
use std::sync::Arc;

pub const S: u16 = 1;
pub const SR: u16 = 2;
pub const SWR: u16 = 3;
pub const WR: u16 = 124;

pub const OFS_A: usize = 0;
pub const OFS_B: usize = 8;
pub const OFS_C: usize = 16;

pub const OFS_S1: usize = 0;
pub const OFS_SR2: usize = 8;
pub const OFS_SR3: usize = 16;

pub const OFS_WR: usize = 0;
pub const OFS_WADR: usize = 0;

/// Layouts of S, SR, SWR and WR
pub fn types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types
        .register(S, TypeInfo::new("S", 24))
        .expect("S layout is valid");
    types
        .register(SR, TypeInfo::new("SR", 24).with_pointers(&[OFS_S1, OFS_SR2, OFS_SR3]))
        .expect("SR layout is valid");
    types
        .register(SWR, TypeInfo::new("SWR", 8).with_pointers(&[OFS_WR]))
        .expect("SWR layout is valid");
    types
        .register(WR, TypeInfo::new("WeakRef", 8).with_weak(OFS_WADR))
        .expect("WR layout is valid");
    types
}

/// Small arenas, invariant checking always on
pub fn test_config() -> StmConfig {
    StmConfig {
        nursery_size: 64 * 1024,
        global_chunk_size: 256 * 1024,
        verify_invariants: true,
        ..Default::default()
    }
}

/// ============================================================================
/// STM FIXTURE
/// ============================================================================

/// Collector plus the emulated substrate behind it
pub struct StmFixture {
    pub gc: Arc<StmGc>,
    pub stm: Arc<EmulatedStm>,
}

impl StmFixture {
    /// **Bug this finds:** Configuration validation bugs, initialization failures
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: StmConfig) -> Self {
        let stm = Arc::new(EmulatedStm::new());
        let gc = StmGc::new(config, types(), stm.clone())
            .expect("collector initialization should succeed with valid config");
        Self { gc, stm }
    }

    /// Register a worker thread and start its first transaction
    pub fn worker(&self) -> StmThread {
        let mut thread = self
            .gc
            .worker_thread()
            .expect("worker registration should succeed");
        thread
            .start_transaction()
            .expect("fresh worker should start a transaction");
        thread
    }

    /// Prebuilt global object of type `tid`
    pub fn global(&self, tid: u16) -> usize {
        self.gc
            .allocate_global(tid)
            .expect("global allocation should succeed")
    }
}

// ============================================================================
// OBJECT HELPERS
// ============================================================================

/// Raw payload read, no barrier
pub fn get(obj: usize, offset: usize) -> usize {
    unsafe { read_field(obj, offset) }
}

/// Raw payload write, no barrier
pub fn set(obj: usize, offset: usize, value: usize) {
    unsafe { write_field(obj, offset, value) }
}

pub fn flags(obj: usize) -> usize {
    unsafe { header(obj) }.flags()
}

pub fn has_flags(obj: usize, mask: usize) -> bool {
    unsafe { header(obj) }.has_flags(mask)
}

pub fn revision(obj: usize) -> Revision {
    unsafe { header(obj) }.revision()
}

pub fn is_global(obj: usize) -> bool {
    unsafe { header(obj) }.is_global()
}

/// Assert global / local-copy status
pub fn check_flags(obj: usize, global: bool, local_copy: bool) {
    let h = unsafe { header(obj) };
    assert_eq!(
        h.is_global(),
        global,
        "object {:#x}: expected global={}, header {:?}",
        obj,
        global,
        h
    );
    assert_eq!(
        h.is_local_copy(),
        local_copy,
        "object {:#x}: expected local_copy={}, header {:?}",
        obj,
        local_copy,
        h
    );
}
