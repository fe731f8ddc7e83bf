//! Runtime Module - Thread glue around the STM protocol
//!
//! Manages:
//! - Check interval / transaction length ([`StmThreadLocals`])
//! - Locks that refuse to block inside atomic transactions ([`StmLock`])
//! - External-call and callback hooks, atomic sections

pub mod extcall;
pub mod lock;
pub mod thread_locals;

pub use lock::StmLock;
pub use thread_locals::StmThreadLocals;
