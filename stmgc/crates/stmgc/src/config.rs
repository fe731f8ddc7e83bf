//! Configuration Module - STM GC Tuning Parameters
//!
//! Manages the configuration parameters of the STM GC: nursery and global
//! chunk sizes, the check interval handed to the substrate as transaction
//! length, and debug verification of header invariants.

use serde::{Deserialize, Serialize};

/// Default check interval, in bytecodes, before a transaction break
pub const DEFAULT_CHECK_INTERVAL: usize = 50_000;

/// Main configuration for the STM GC
///
/// # Examples
///
/// ```rust
/// use stmgc::StmConfig;
///
/// let config = StmConfig {
///     nursery_size: 256 * 1024,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StmConfig {
    /// Size of each thread's nursery arena in bytes
    ///
    /// Objects allocated inside a transaction and local copies live here
    /// until the next local collection.
    /// Default: 1MB
    pub nursery_size: usize,

    /// Size of one chunk of global space in bytes
    ///
    /// Objects larger than a chunk get a dedicated mapping.
    /// Default: 4MB
    pub global_chunk_size: usize,

    /// Upper bound on bytes handed out by global space
    ///
    /// Allocation beyond it fails with `OutOfMemory`; a local collection
    /// hitting it aborts the transaction.
    /// Default: unbounded
    #[serde(default)]
    pub max_global_size: Option<usize>,

    /// Check interval handed to the substrate as the transaction length
    ///
    /// Default: 50000
    pub check_interval: usize,

    /// Check every promoted copy and root slot after each local collection
    ///
    /// Header flag/revision consistency on mutation is checked separately,
    /// in debug builds only.
    /// Default: true in debug builds, false in release builds
    pub verify_invariants: bool,
}

impl Default for StmConfig {
    fn default() -> Self {
        StmConfig {
            nursery_size: MB,
            global_chunk_size: 4 * MB,
            max_global_size: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
            verify_invariants: cfg!(debug_assertions),
        }
    }
}

impl StmConfig {
    /// Validate configuration
    ///
    /// ```rust
    /// use stmgc::StmConfig;
    ///
    /// let config = StmConfig {
    ///     nursery_size: 0,
    ///     ..Default::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nursery_size < MIN_ARENA_SIZE {
            return Err(ConfigError::InvalidNurserySize(format!(
                "nursery_size must be at least {} bytes",
                MIN_ARENA_SIZE
            )));
        }

        if self.nursery_size % WORD != 0 {
            return Err(ConfigError::InvalidNurserySize(
                "nursery_size must be a multiple of the word size".to_string(),
            ));
        }

        if self.global_chunk_size < MIN_ARENA_SIZE {
            return Err(ConfigError::InvalidChunkSize(format!(
                "global_chunk_size must be at least {} bytes",
                MIN_ARENA_SIZE
            )));
        }

        if let Some(limit) = self.max_global_size {
            if limit < MIN_ARENA_SIZE {
                return Err(ConfigError::InvalidGlobalLimit(format!(
                    "max_global_size must be at least {} bytes",
                    MIN_ARENA_SIZE
                )));
            }
        }

        if self.check_interval == 0 {
            return Err(ConfigError::InvalidCheckInterval(
                "check_interval must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - STMGC_NURSERY_SIZE
    /// - STMGC_GLOBAL_CHUNK_SIZE
    /// - STMGC_MAX_GLOBAL_SIZE
    /// - STMGC_CHECK_INTERVAL
    /// - STMGC_VERIFY
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("STMGC_NURSERY_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.nursery_size = size;
            }
        }

        if let Ok(val) = std::env::var("STMGC_GLOBAL_CHUNK_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.global_chunk_size = size;
            }
        }

        if let Ok(val) = std::env::var("STMGC_MAX_GLOBAL_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.max_global_size = Some(size);
            }
        }

        if let Ok(val) = std::env::var("STMGC_CHECK_INTERVAL") {
            if let Ok(interval) = val.parse::<usize>() {
                config.check_interval = interval;
            }
        }

        if let Ok(val) = std::env::var("STMGC_VERIFY") {
            config.verify_invariants = val == "1" || val.eq_ignore_ascii_case("true");
        }

        config
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid nursery size: {0}")]
    InvalidNurserySize(String),

    #[error("Invalid global chunk size: {0}")]
    InvalidChunkSize(String),

    #[error("Invalid global size limit: {0}")]
    InvalidGlobalLimit(String),

    #[error("Invalid check interval: {0}")]
    InvalidCheckInterval(String),
}

// ============================================================================
// CONSTANTS
// ============================================================================

const WORD: usize = std::mem::size_of::<usize>();
const KB: usize = 1024;
const MB: usize = 1024 * 1024;

/// Smallest arena accepted for a nursery or a global chunk
pub const MIN_ARENA_SIZE: usize = 4 * KB;
