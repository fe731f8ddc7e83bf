//! # stmgc-loops - Random-loop interpreter over stmgc
//!
//! A tiny stack-free bytecode used to stress the barriers: each character
//! is one opcode, registers `a` to `e` carry the program's arguments and
//! results.
//!
//! | opcode        | effect                                              |
//! |---------------|-----------------------------------------------------|
//! | `0`-`9`       | value = digit                                       |
//! | `a`-`e`       | value = register                                    |
//! | `A`-`E`       | register = value                                    |
//! | `+ - > < =`   | value = prev op value                               |
//! | `{` ... `}`   | loop while value is non-zero at `}`                 |
//! | `x`           | leave the innermost loop                            |
//! | `(` ... `)`   | skip the body when value is zero (value becomes 1), |
//! |               | `)` sets value to 0                                 |
//! | space, `\n`   | nothing                                             |
//!
//! `prev` is the value as it was before the previous opcode ran.
//!
//! [`Program::run`] interprets with plain registers; [`Program::run_stm`]
//! keeps every register boxed in an [`stmgc`] object graph and takes a
//! transaction boundary every `check_interval` opcodes, so both must agree.
//!
//! ```rust
//! use stmgc::{StmConfig, StmGc, TypeRegistry};
//! use stmgc_loops::{register_types, Program};
//!
//! let mut types = TypeRegistry::new();
//! register_types(&mut types).unwrap();
//! let gc = StmGc::emulated(StmConfig::default(), types).unwrap();
//! let mut thread = gc.worker_thread().unwrap();
//! thread.start_transaction().unwrap();
//!
//! let program = Program::parse("0A9B{ab+Ab1-Bb}").unwrap();
//! let args = [0; 5];
//! assert_eq!(program.run_stm(&mut thread, args).unwrap(), program.run(args).unwrap());
//! ```

pub mod error;
pub mod frame;
pub mod program;
pub mod registers;

pub use error::{LoopError, Result};
pub use frame::{register_types, StmFrame, FRAME, INT_BOX};
pub use program::{BinOp, Op, Program};
pub use registers::{PlainRegisters, Reg, Registers, ARGS, REGS};
