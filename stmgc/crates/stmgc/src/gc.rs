//! STM GC - State shared by all threads
//!
//! [`StmGc`] owns what every thread may touch concurrently: configuration,
//! type layouts, global space, the thread registry, statistics and the
//! substrate. Per-thread state lives in [`StmThread`].

use crate::allocator::GlobalSpace;
use crate::config::StmConfig;
use crate::error::Result;
use crate::object::header::{header, Revision, PREBUILT_FLAGS};
use crate::object::TypeRegistry;
use crate::runtime::StmThreadLocals;
use crate::stats::StmStats;
use crate::substrate::{EmulatedStm, StmOperations};
use crate::tls::{StmThread, ThreadRegistry};
use std::sync::Arc;

/// StmGc - shared collector state
///
/// # Examples
///
/// ```rust
/// use stmgc::object::{TypeInfo, TypeRegistry};
/// use stmgc::{StmConfig, StmGc};
///
/// let mut types = TypeRegistry::new();
/// types.register(1, TypeInfo::new("S", 24)).unwrap();
/// let gc = StmGc::emulated(StmConfig::default(), types).unwrap();
///
/// let mut worker = gc.worker_thread().unwrap();
/// worker.start_transaction().unwrap();
/// let obj = worker.allocate_object(1).unwrap();
/// assert_eq!(worker.write_barrier(obj).unwrap(), obj);
/// worker.stop_transaction().unwrap();
/// ```
pub struct StmGc {
    config: StmConfig,
    types: TypeRegistry,
    global: GlobalSpace,
    threads: ThreadRegistry,
    stats: StmStats,
    substrate: Arc<dyn StmOperations>,
    thread_locals: StmThreadLocals,
}

impl StmGc {
    /// Create collector over `substrate`
    ///
    /// # Returns
    /// `Configuration` error if `config` does not validate.
    pub fn new(
        config: StmConfig,
        types: TypeRegistry,
        substrate: Arc<dyn StmOperations>,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        log::debug!(
            "stmgc: nursery {} bytes, global chunks {} bytes, {} types",
            config.nursery_size,
            config.global_chunk_size,
            types.len()
        );

        Ok(Arc::new(Self {
            global: GlobalSpace::with_limit(config.global_chunk_size, config.max_global_size),
            thread_locals: StmThreadLocals::new(substrate.clone(), config.check_interval),
            threads: ThreadRegistry::new(),
            stats: StmStats::default(),
            config,
            types,
            substrate,
        }))
    }

    /// Create collector over a fresh [`EmulatedStm`]
    pub fn emulated(config: StmConfig, types: TypeRegistry) -> Result<Arc<Self>> {
        Self::new(config, types, Arc::new(EmulatedStm::new()))
    }

    /// Register the main thread (number 0)
    pub fn main_thread(self: &Arc<Self>) -> Result<StmThread> {
        let num = self.threads.register_main()?;
        StmThread::new(Arc::clone(self), num).map_err(|e| {
            self.threads.unregister(num);
            e
        })
    }

    /// Register a worker thread (numbers from 1)
    pub fn worker_thread(self: &Arc<Self>) -> Result<StmThread> {
        let num = self.threads.register_worker();
        StmThread::new(Arc::clone(self), num).map_err(|e| {
            self.threads.unregister(num);
            e
        })
    }

    /// Allocate a prebuilt global object of type `tid`
    ///
    /// The object is zeroed, `GLOBAL | NOT_WRITTEN`, revision `Initial`.
    pub fn allocate_global(&self, tid: u16) -> Result<usize> {
        let size = self.types.layout(tid).total_size();
        let obj = self.global.allocate(size)?;
        unsafe { header(obj) }.reinit(tid, PREBUILT_FLAGS, Revision::Initial);
        Ok(obj)
    }

    #[inline]
    pub fn config(&self) -> &StmConfig {
        &self.config
    }

    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[inline]
    pub fn global_space(&self) -> &GlobalSpace {
        &self.global
    }

    #[inline]
    pub fn threads(&self) -> &ThreadRegistry {
        &self.threads
    }

    #[inline]
    pub fn stats(&self) -> &StmStats {
        &self.stats
    }

    #[inline]
    pub fn substrate(&self) -> &Arc<dyn StmOperations> {
        &self.substrate
    }

    #[inline]
    pub fn thread_locals(&self) -> &StmThreadLocals {
        &self.thread_locals
    }
}

impl std::fmt::Debug for StmGc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StmGc")
            .field("config", &self.config)
            .field("types", &self.types.len())
            .field("threads", &self.threads.live_threads())
            .finish()
    }
}
