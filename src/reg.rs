use crate::cpu::Cpu;
use crate::error::CpuError;

pub const NUM_REGS: usize = 8;

/// R7 mirrors the initial stack pointer.
pub const SP_REG: usize = 7;
pub const STACK_TOP: u8 = 0xF4;

// Flag bits in FL. A compare sets exactly one of them.
pub const FL_EQ: u8 = 0b0000_0001;
pub const FL_GT: u8 = 0b0000_0010;
pub const FL_LT: u8 = 0b0000_0100;

impl Cpu {
    pub fn reg(&self, index: u8) -> Result<u8, CpuError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(CpuError::RegisterOutOfRange { index, pc: self.pc })
    }

    pub fn set_reg(&mut self, index: u8, val: u8) -> Result<(), CpuError> {
        let pc = self.pc;
        let slot = self
            .regs
            .get_mut(index as usize)
            .ok_or(CpuError::RegisterOutOfRange { index, pc })?;
        *slot = val;
        Ok(())
    }

    pub fn flag(&self, bit: u8) -> bool {
        self.fl & bit != 0
    }
}
