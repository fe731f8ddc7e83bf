//! Register file and the interpreter loop

use crate::error::{LoopError, Result};
use crate::program::{Op, Program};

/// Number of program arguments, registers `a` to `e`
pub const ARGS: usize = 5;

/// Number of registers in a frame
pub const REGS: usize = 8;

/// Registers a program can name, plus the three the interpreter keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    A,
    B,
    C,
    D,
    E,
    /// Result of the last opcode
    Value,
    /// Value before the previous opcode, left operand of binary ops
    Prev,
    /// Value before the running opcode
    Current,
}

impl Reg {
    pub const ALL: [Reg; REGS] = [
        Reg::A,
        Reg::B,
        Reg::C,
        Reg::D,
        Reg::E,
        Reg::Value,
        Reg::Prev,
        Reg::Current,
    ];
    pub const ARGS: [Reg; ARGS] = [Reg::A, Reg::B, Reg::C, Reg::D, Reg::E];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Storage behind the interpreter
///
/// `copy` moves a value without inspecting it, so backends holding boxed
/// values can share the box.
pub trait Registers {
    fn get(&mut self, reg: Reg) -> Result<i64>;
    fn set(&mut self, reg: Reg, value: i64) -> Result<()>;

    fn copy(&mut self, from: Reg, to: Reg) -> Result<()> {
        let value = self.get(from)?;
        self.set(to, value)
    }

    /// Called before every opcode
    fn tick(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Plain in-memory registers
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlainRegisters {
    values: [i64; REGS],
}

impl PlainRegisters {
    pub fn new(args: [i64; ARGS]) -> Self {
        let mut values = [0; REGS];
        values[..ARGS].copy_from_slice(&args);
        Self { values }
    }

    pub fn args(&self) -> [i64; ARGS] {
        let mut args = [0; ARGS];
        args.copy_from_slice(&self.values[..ARGS]);
        args
    }
}

impl Registers for PlainRegisters {
    #[inline]
    fn get(&mut self, reg: Reg) -> Result<i64> {
        Ok(self.values[reg.index()])
    }

    #[inline]
    fn set(&mut self, reg: Reg, value: i64) -> Result<()> {
        self.values[reg.index()] = value;
        Ok(())
    }
}

impl Program {
    /// Run the program against `regs`
    pub fn execute<R: Registers>(&self, regs: &mut R) -> Result<()> {
        let mut loops: Vec<usize> = Vec::new();
        let mut pc = 0;

        while pc < self.ops.len() {
            regs.tick()?;
            regs.copy(Reg::Value, Reg::Current)?;

            match self.ops[pc] {
                Op::Const(n) => regs.set(Reg::Value, n)?,
                Op::Load(reg) => regs.copy(reg, Reg::Value)?,
                Op::Store(reg) => regs.copy(Reg::Value, reg)?,
                Op::Binary(op) => {
                    let prev = regs.get(Reg::Prev)?;
                    let value = regs.get(Reg::Value)?;
                    regs.set(Reg::Value, op.apply(prev, value))?;
                }
                Op::LoopStart => loops.push(pc),
                Op::LoopEnd => {
                    if regs.get(Reg::Value)? != 0 {
                        pc -= self.offsets[pc];
                    } else {
                        loops.pop();
                    }
                }
                Op::Break => {
                    let start = loops.pop().ok_or(LoopError::BreakOutsideLoop(pc))?;
                    pc = start + self.offsets[start];
                }
                Op::IfStart => {
                    if regs.get(Reg::Value)? == 0 {
                        regs.set(Reg::Value, 1)?;
                        pc += self.offsets[pc];
                    }
                }
                Op::IfEnd => regs.set(Reg::Value, 0)?,
                Op::Nop => {}
            }

            regs.copy(Reg::Current, Reg::Prev)?;
            pc += 1;
        }
        Ok(())
    }

    /// Run with plain registers, returning `a` to `e`
    pub fn run(&self, args: [i64; ARGS]) -> Result<[i64; ARGS]> {
        let mut regs = PlainRegisters::new(args);
        self.execute(&mut regs)?;
        Ok(regs.args())
    }
}
