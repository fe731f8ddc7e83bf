//! Program decoding and bracket matching
//!
//! A program is one opcode per character. The program counter indexes
//! characters, so whitespace occupies a slot like any other opcode.

use crate::error::{LoopError, Result};
use crate::registers::Reg;

/// Binary operators over the previous and current value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Gt,
    Lt,
    Eq,
}

impl BinOp {
    /// Comparisons produce 1 or 0
    pub fn apply(self, prev: i64, value: i64) -> i64 {
        match self {
            BinOp::Add => prev.wrapping_add(value),
            BinOp::Sub => prev.wrapping_sub(value),
            BinOp::Gt => (prev > value) as i64,
            BinOp::Lt => (prev < value) as i64,
            BinOp::Eq => (prev == value) as i64,
        }
    }
}

/// One decoded opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `0`-`9`
    Const(i64),
    /// `a`-`e`
    Load(Reg),
    /// `A`-`E`
    Store(Reg),
    /// `+ - > < =`
    Binary(BinOp),
    /// `{`
    LoopStart,
    /// `}`: jump back while the value is non-zero
    LoopEnd,
    /// `x`: leave the innermost loop
    Break,
    /// `(`: skip to the matching `)` if the value is zero
    IfStart,
    /// `)`
    IfEnd,
    /// space or newline
    Nop,
}

impl Op {
    fn decode(op: char, pc: usize) -> Result<Self> {
        let decoded = match op {
            '0'..='9' => Op::Const(op as i64 - '0' as i64),
            'a' => Op::Load(Reg::A),
            'b' => Op::Load(Reg::B),
            'c' => Op::Load(Reg::C),
            'd' => Op::Load(Reg::D),
            'e' => Op::Load(Reg::E),
            'A' => Op::Store(Reg::A),
            'B' => Op::Store(Reg::B),
            'C' => Op::Store(Reg::C),
            'D' => Op::Store(Reg::D),
            'E' => Op::Store(Reg::E),
            '+' => Op::Binary(BinOp::Add),
            '-' => Op::Binary(BinOp::Sub),
            '>' => Op::Binary(BinOp::Gt),
            '<' => Op::Binary(BinOp::Lt),
            '=' => Op::Binary(BinOp::Eq),
            '{' => Op::LoopStart,
            '}' => Op::LoopEnd,
            'x' => Op::Break,
            '(' => Op::IfStart,
            ')' => Op::IfEnd,
            ' ' | '\n' => Op::Nop,
            _ => return Err(LoopError::UnknownOpcode { op, pc }),
        };
        Ok(decoded)
    }
}

/// Decoded program with its bracket table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub(crate) ops: Vec<Op>,
    /// Distance between matching brackets, stored at both ends
    pub(crate) offsets: Vec<usize>,
}

impl Program {
    /// Decode `source` and match its brackets
    ///
    /// # Example
    ///
    /// ```
    /// use stmgc_loops::Program;
    ///
    /// let program = Program::parse("0A9B{ab+Ab1-Bb}").unwrap();
    /// assert_eq!(program.run([0; 5]).unwrap()[0], 45);
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let chars: Vec<char> = source.chars().collect();
        let ops = chars
            .iter()
            .enumerate()
            .map(|(pc, &op)| Op::decode(op, pc))
            .collect::<Result<Vec<_>>>()?;

        let mut offsets = vec![0; chars.len()];
        let mut open: Vec<(usize, char)> = Vec::new();
        for (pc, &op) in chars.iter().enumerate() {
            match op {
                '{' | '(' => open.push((pc, op)),
                '}' | ')' => {
                    let (start, start_op) = open
                        .pop()
                        .ok_or(LoopError::UnbalancedBracket { bracket: op, pc })?;
                    if !matches!((start_op, op), ('{', '}') | ('(', ')')) {
                        return Err(LoopError::MismatchedBracket {
                            open: start_op,
                            open_pc: start,
                            close: op,
                            close_pc: pc,
                        });
                    }
                    offsets[start] = pc - start;
                    offsets[pc] = pc - start;
                }
                _ => {}
            }
        }
        if let Some((pc, bracket)) = open.pop() {
            return Err(LoopError::UnbalancedBracket { bracket, pc });
        }

        Ok(Self { ops, offsets })
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
