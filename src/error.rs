use std::io;

use thiserror::Error;

use crate::alu::AluOp;

/// Faults raised while loading or executing a program.
#[derive(Debug, Error)]
pub enum CpuError {
    #[error("program is {len} bytes but memory holds only {capacity}")]
    ProgramTooLarge { len: usize, capacity: usize },
    #[error("unknown instruction {opcode:#010b} at pc={pc:#04x}")]
    UnknownInstruction { opcode: u8, pc: u8 },
    /// Division or modulo by zero.
    #[error("{op:?} R{reg_a}, R{reg_b}: division by zero")]
    ArithmeticError { op: AluOp, reg_a: u8, reg_b: u8 },
    #[error("unsupported ALU operation {0:#04x}")]
    UnsupportedOperation(u8),
    #[error("register R{index} out of range at pc={pc:#04x}")]
    RegisterOutOfRange { index: u8, pc: u8 },
    /// Memory access, operand fetch or PC move past the 256 byte address space.
    #[error("address {addr:#x} out of range at pc={pc:#04x}")]
    AddressOutOfRange { addr: usize, pc: u8 },
    /// PUSH or CALL with SP already at address 0.
    #[error("stack overflow at pc={pc:#04x}")]
    StackOverflow { pc: u8 },
    /// POP or RET that would move SP past the top of memory.
    #[error("stack underflow at pc={pc:#04x}")]
    StackUnderflow { pc: u8 },
    #[error("step limit of {steps} instructions exceeded")]
    StepLimitExceeded { steps: u64 },
    #[error("failed to write output")]
    Output(#[from] io::Error),
}

/// Errors produced while decoding `.ls8` program text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: `{text}` is not an 8-bit binary literal")]
    InvalidLiteral { line: usize, text: String },
}
