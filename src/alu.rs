use crate::cpu::Cpu;
use crate::error::CpuError;
use crate::reg::{FL_EQ, FL_GT, FL_LT};

/// Operation kinds the ALU understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Cmp,
}

impl TryFrom<u8> for AluOp {
    type Error = CpuError;

    /// ALU opcodes share the `101` prefix; the low nibble picks the kind.
    fn try_from(opcode: u8) -> Result<Self, Self::Error> {
        if opcode & 0b1110_0000 != 0b1010_0000 {
            return Err(CpuError::UnsupportedOperation(opcode));
        }
        match opcode & 0x0F {
            0b0000 => Ok(AluOp::Add),
            0b0001 => Ok(AluOp::Sub),
            0b0010 => Ok(AluOp::Mul),
            0b0011 => Ok(AluOp::Div),
            0b0100 => Ok(AluOp::Mod),
            0b0111 => Ok(AluOp::Cmp),
            _ => Err(CpuError::UnsupportedOperation(opcode)),
        }
    }
}

impl Cpu {
    /// Applies `op` to `R[reg_a]` and `R[reg_b]`.
    ///
    /// Arithmetic kinds store their (8-bit wrapped) result in `R[reg_a]`,
    /// `Cmp` only touches the flags register.
    pub fn alu(&mut self, op: AluOp, reg_a: u8, reg_b: u8) -> Result<(), CpuError> {
        let a = self.reg(reg_a)?;
        let b = self.reg(reg_b)?;
        let result = match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Mul => a.wrapping_mul(b),
            AluOp::Div => a
                .checked_div(b)
                .ok_or(CpuError::ArithmeticError { op, reg_a, reg_b })?,
            AluOp::Mod => a
                .checked_rem(b)
                .ok_or(CpuError::ArithmeticError { op, reg_a, reg_b })?,
            AluOp::Cmp => {
                self.fl = if a == b {
                    FL_EQ
                } else if a < b {
                    FL_LT
                } else {
                    FL_GT
                };
                return Ok(());
            }
        };
        self.set_reg(reg_a, result)
    }
}
