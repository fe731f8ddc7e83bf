//! Interpreter frame living in STM-managed memory
//!
//! Every register holds a pointer to an immutable `IntBox`. The frame
//! itself is a single object kept in a root slot, so it follows the
//! thread through localization and local collections: every access
//! re-reads the slot and goes through the barriers.
//!
//! Inside a transaction the frame commits every `check_interval` opcodes.
//! Outside one (or on the main thread) everything is allocated global and
//! the barriers degrade to `latest_revision`.

use crate::error::{LoopError, Result};
use crate::program::Program;
use crate::registers::{Reg, Registers, ARGS, REGS};
use stmgc::object::{read_field, write_field, TypeInfo, TypeRegistry, WORD};
use stmgc::StmThread;

/// Type id of a boxed integer
pub const INT_BOX: u16 = 0x100;

/// Type id of the interpreter frame
pub const FRAME: u16 = 0x101;

/// Register the interpreter's object types
pub fn register_types(types: &mut TypeRegistry) -> stmgc::Result<()> {
    let slots: Vec<usize> = Reg::ALL.iter().map(|reg| reg.index() * WORD).collect();
    types.register(INT_BOX, TypeInfo::new("IntBox", WORD))?;
    types.register(
        FRAME,
        TypeInfo::new("Frame", REGS * WORD).with_pointers(&slots),
    )?;
    Ok(())
}

/// Registers backed by a rooted frame object
pub struct StmFrame<'t> {
    thread: &'t mut StmThread,
    slot: usize,
    since_commit: usize,
    commits: usize,
}

impl<'t> StmFrame<'t> {
    /// Allocate the frame and box the arguments
    ///
    /// `Value`, `Prev` and `Current` start at zero.
    pub fn new(thread: &'t mut StmThread, args: [i64; ARGS]) -> Result<Self> {
        let frame = thread.allocate_object(FRAME)?;
        let slot = thread.root_count();
        thread.push_root(frame);

        let mut this = Self {
            thread,
            slot,
            since_commit: 0,
            commits: 0,
        };
        for (reg, value) in Reg::ARGS.iter().zip(args) {
            this.set(*reg, value)?;
        }
        for reg in [Reg::Value, Reg::Prev, Reg::Current] {
            this.set(reg, 0)?;
        }
        Ok(this)
    }

    /// Transaction boundaries taken so far
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Current values of `a` to `e`
    pub fn args(&mut self) -> Result<[i64; ARGS]> {
        let mut args = [0; ARGS];
        for (out, reg) in args.iter_mut().zip(Reg::ARGS) {
            *out = self.get(reg)?;
        }
        Ok(args)
    }

    fn frame(&self) -> Result<usize> {
        match self.thread.root(self.slot) {
            Some(frame) if frame != 0 => Ok(frame),
            _ => Err(LoopError::FrameLost),
        }
    }

    fn load(&self, reg: Reg) -> Result<usize> {
        let frame = self.thread.read_barrier(self.frame()?);
        Ok(unsafe { read_field(frame, reg.index() * WORD) })
    }

    fn store(&mut self, reg: Reg, int_box: usize) -> Result<()> {
        // the write barrier may allocate, which may collect
        self.thread.push_root(int_box);
        let frame = self.frame()?;
        let frame = self.thread.write_barrier(frame)?;
        let int_box = self.thread.pop_root().ok_or(LoopError::FrameLost)?;
        unsafe { write_field(frame, reg.index() * WORD, int_box) };
        Ok(())
    }
}

impl Registers for StmFrame<'_> {
    fn get(&mut self, reg: Reg) -> Result<i64> {
        let int_box = self.thread.read_barrier(self.load(reg)?);
        Ok(unsafe { read_field(int_box, 0) } as i64)
    }

    fn set(&mut self, reg: Reg, value: i64) -> Result<()> {
        let int_box = self.thread.allocate_object(INT_BOX)?;
        unsafe { write_field(int_box, 0, value as usize) };
        self.store(reg, int_box)
    }

    fn copy(&mut self, from: Reg, to: Reg) -> Result<()> {
        let int_box = self.load(from)?;
        self.store(to, int_box)
    }

    fn tick(&mut self) -> Result<()> {
        if !self.thread.in_transaction() {
            return Ok(());
        }
        self.since_commit += 1;
        if self.since_commit >= self.thread.gc().thread_locals().check_interval() {
            self.thread.commit_transaction()?;
            self.since_commit = 0;
            self.commits += 1;
        }
        Ok(())
    }
}

impl Drop for StmFrame<'_> {
    fn drop(&mut self) {
        while self.thread.root_count() > self.slot {
            self.thread.pop_root();
        }
    }
}

impl Program {
    /// Run with registers in STM-managed memory, returning `a` to `e`
    ///
    /// The thread's types must include [`register_types`]. The thread is
    /// left in the transaction state it was found in.
    pub fn run_stm(&self, thread: &mut StmThread, args: [i64; ARGS]) -> Result<[i64; ARGS]> {
        let mut frame = StmFrame::new(thread, args)?;
        self.execute(&mut frame)?;
        log::debug!(
            "program of {} ops finished after {} commits",
            self.len(),
            frame.commits()
        );
        frame.args()
    }
}
