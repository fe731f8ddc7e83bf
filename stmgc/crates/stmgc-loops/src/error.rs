//! Error types for the loop interpreter

use stmgc::StmError;
use thiserror::Error;

/// Error type for parsing and running loop programs
#[derive(Debug, Error)]
pub enum LoopError {
    /// Character that is not an opcode
    #[error("Unknown opcode {op:?} at {pc}")]
    UnknownOpcode { op: char, pc: usize },

    /// Opening bracket never closed, or closing bracket never opened
    #[error("Unbalanced bracket {bracket:?} at {pc}")]
    UnbalancedBracket { bracket: char, pc: usize },

    /// `{` closed by `)` or `(` closed by `}`
    #[error("Bracket {open:?} at {open_pc} closed by {close:?} at {close_pc}")]
    MismatchedBracket {
        open: char,
        open_pc: usize,
        close: char,
        close_pc: usize,
    },

    /// `x` executed with no loop running
    #[error("Break outside of a loop at {0}")]
    BreakOutsideLoop(usize),

    /// Internal error - the frame's root slot was popped by someone else
    #[error("Interpreter frame missing from its root slot")]
    FrameLost,

    /// Failure inside the STM runtime
    #[error("STM error: {0}")]
    Stm(#[from] StmError),
}

/// Result type alias for loop interpreter operations
pub type Result<T> = std::result::Result<T, LoopError>;
