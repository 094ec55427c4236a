use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, trace, warn};

use crate::error::CpuError;
use crate::isa;
use crate::reg::{NUM_REGS, SP_REG, STACK_TOP};
use crate::snapshot::Snapshot;

pub const MEMORY_SIZE: usize = 256;

#[derive(Clone)]
pub struct Cpu {
    pub regs: [u8; NUM_REGS],
    pub pc: u8,
    pub sp: u8,
    pub fl: u8,
    pub mem: [u8; MEMORY_SIZE],
    running: bool,
    steps: u64,
}

/// How a run ended when no fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Halted,
    Cancelled,
}

/// Bounds an embedding caller can put around `run`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunLimits<'a> {
    pub max_steps: Option<u64>,
    /// Polled between instructions; once set the run stops cooperatively.
    pub cancel: Option<&'a AtomicBool>,
}

impl Default for Cpu {
    fn default() -> Self {
        let mut regs = [0; NUM_REGS];
        regs[SP_REG] = STACK_TOP;
        Self {
            regs,
            pc: 0,
            sp: STACK_TOP,
            fl: 0,
            mem: [0; MEMORY_SIZE],
            running: true,
            steps: 0,
        }
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(code: &[u8]) -> Result<Self, CpuError> {
        let mut cpu = Self::new();
        cpu.load(code)?;
        Ok(cpu)
    }

    /// Puts the machine back in its power-on state and copies `code` into
    /// memory starting at address 0. A program that does not fit leaves the
    /// machine untouched.
    pub fn load(&mut self, code: &[u8]) -> Result<(), CpuError> {
        if code.len() > MEMORY_SIZE {
            return Err(CpuError::ProgramTooLarge {
                len: code.len(),
                capacity: MEMORY_SIZE,
            });
        }
        *self = Self::default();
        self.mem[..code.len()].copy_from_slice(code);
        debug!("loaded {} program bytes", code.len());
        Ok(())
    }

    /// Back to power-on state. Memory is cleared too.
    pub fn reset(&mut self) {
        *self = Self::default();
        debug!("cpu reset");
    }

    pub fn ram_read(&self, addr: usize) -> Result<u8, CpuError> {
        self.mem
            .get(addr)
            .copied()
            .ok_or(CpuError::AddressOutOfRange { addr, pc: self.pc })
    }

    pub fn ram_write(&mut self, addr: usize, val: u8) -> Result<(), CpuError> {
        let pc = self.pc;
        let cell = self
            .mem
            .get_mut(addr)
            .ok_or(CpuError::AddressOutOfRange { addr, pc })?;
        *cell = val;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn snapshot(&self) -> Snapshot {
        let byte_at = |offset: usize| self.mem.get(self.pc as usize + offset).copied().unwrap_or(0);
        Snapshot {
            pc: self.pc,
            fl: self.fl,
            sp: self.sp,
            next: [byte_at(0), byte_at(1), byte_at(2)],
            regs: self.regs,
        }
    }

    /// Operand byte `n` (1 or 2) of the instruction at PC.
    pub(crate) fn operand(&self, n: usize) -> Result<u8, CpuError> {
        self.ram_read(self.pc as usize + n)
    }

    /// Address of the instruction after the one at PC. The operand count
    /// sits in the top two bits of the opcode. Handlers call this before any
    /// side effect so an instruction ending at 255 faults without effect.
    pub(crate) fn next_pc(&self, opcode: u8) -> Result<u8, CpuError> {
        let next = self.pc as usize + isa::instruction_len(opcode);
        u8::try_from(next).map_err(|_| CpuError::AddressOutOfRange {
            addr: next,
            pc: self.pc,
        })
    }

    pub(crate) fn halt(&mut self) {
        self.running = false;
    }

    pub(crate) fn push(&mut self, val: u8) -> Result<(), CpuError> {
        let sp = self
            .sp
            .checked_sub(1)
            .ok_or(CpuError::StackOverflow { pc: self.pc })?;
        self.ram_write(sp as usize, val)?;
        self.sp = sp;
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<u8, CpuError> {
        let next_sp = self
            .sp
            .checked_add(1)
            .ok_or(CpuError::StackUnderflow { pc: self.pc })?;
        let val = self.ram_read(self.sp as usize)?;
        self.sp = next_sp;
        Ok(val)
    }

    /// Fetches, decodes and executes a single instruction.
    pub fn step(&mut self, out: &mut dyn Write) -> Result<(), CpuError> {
        let pc = self.pc;
        let opcode = self.ram_read(pc as usize)?;
        let handler = isa::handler(opcode).ok_or(CpuError::UnknownInstruction { opcode, pc })?;
        trace!("{} {}", self.snapshot(), isa::mnemonic(opcode).unwrap_or("???"));
        handler(self, opcode, out)?;
        self.steps += 1;
        Ok(())
    }

    pub fn run(&mut self, out: &mut dyn Write) -> Result<ExitStatus, CpuError> {
        self.run_with(out, &RunLimits::default())
    }

    pub fn run_with(
        &mut self,
        out: &mut dyn Write,
        limits: &RunLimits<'_>,
    ) -> Result<ExitStatus, CpuError> {
        self.run_observed(out, limits, |_| {})
    }

    /// Runs until HLT, a fault, or one of `limits` fires. `observe` sees the
    /// machine state before every instruction.
    pub fn run_observed<F>(
        &mut self,
        out: &mut dyn Write,
        limits: &RunLimits<'_>,
        mut observe: F,
    ) -> Result<ExitStatus, CpuError>
    where
        F: FnMut(&Snapshot),
    {
        let mut executed: u64 = 0;
        while self.running {
            if let Some(cancel) = limits.cancel {
                if cancel.load(Ordering::Relaxed) {
                    warn!("run cancelled at pc={:#04x} after {} steps", self.pc, executed);
                    return Ok(ExitStatus::Cancelled);
                }
            }
            if let Some(max) = limits.max_steps {
                if executed >= max {
                    return Err(CpuError::StepLimitExceeded { steps: max });
                }
            }
            observe(&self.snapshot());
            self.step(out)?;
            executed += 1;
        }
        info!("halted after {} steps", executed);
        Ok(ExitStatus::Halted)
    }
}
