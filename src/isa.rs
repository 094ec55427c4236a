//! LS-8 instruction set: opcode values, the dispatch table and the handlers.
//!
//! Opcodes are laid out as `AABCDDDD`: `AA` is the operand count, `B` marks
//! ALU instructions, `C` marks instructions that set PC themselves.

use std::io::Write;

use crate::alu::AluOp;
use crate::cpu::Cpu;
use crate::error::CpuError;
use crate::reg::{FL_EQ, FL_GT, FL_LT};

pub const HLT: u8 = 0b0000_0001;
pub const RET: u8 = 0b0001_0001;
pub const PUSH: u8 = 0b0100_0101;
pub const POP: u8 = 0b0100_0110;
pub const PRN: u8 = 0b0100_0111;
pub const CALL: u8 = 0b0101_0000;
pub const JMP: u8 = 0b0101_0100;
pub const JEQ: u8 = 0b0101_0101;
pub const JNE: u8 = 0b0101_0110;
pub const JGT: u8 = 0b0101_0111;
pub const JLT: u8 = 0b0101_1000;
pub const LDI: u8 = 0b1000_0010;
pub const ADD: u8 = 0b1010_0000;
pub const SUB: u8 = 0b1010_0001;
pub const MUL: u8 = 0b1010_0010;
pub const DIV: u8 = 0b1010_0011;
pub const MOD: u8 = 0b1010_0100;
pub const CMP: u8 = 0b1010_0111;

pub type Handler = fn(&mut Cpu, u8, &mut dyn Write) -> Result<(), CpuError>;

static DISPATCH: [Option<Handler>; 256] = build_table();

const fn build_table() -> [Option<Handler>; 256] {
    let mut table: [Option<Handler>; 256] = [None; 256];
    table[HLT as usize] = Some(op_hlt as Handler);
    table[RET as usize] = Some(op_ret as Handler);
    table[PUSH as usize] = Some(op_push as Handler);
    table[POP as usize] = Some(op_pop as Handler);
    table[PRN as usize] = Some(op_prn as Handler);
    table[CALL as usize] = Some(op_call as Handler);
    table[JMP as usize] = Some(op_jmp as Handler);
    table[JEQ as usize] = Some(op_jeq as Handler);
    table[JNE as usize] = Some(op_jne as Handler);
    table[JGT as usize] = Some(op_jgt as Handler);
    table[JLT as usize] = Some(op_jlt as Handler);
    table[LDI as usize] = Some(op_ldi as Handler);
    table[ADD as usize] = Some(op_alu as Handler);
    table[SUB as usize] = Some(op_alu as Handler);
    table[MUL as usize] = Some(op_alu as Handler);
    table[DIV as usize] = Some(op_alu as Handler);
    table[MOD as usize] = Some(op_alu as Handler);
    table[CMP as usize] = Some(op_alu as Handler);
    table
}

pub fn handler(opcode: u8) -> Option<Handler> {
    DISPATCH[opcode as usize]
}

/// Total instruction length in bytes, opcode included.
pub const fn instruction_len(opcode: u8) -> usize {
    (opcode >> 6) as usize + 1
}

pub fn mnemonic(opcode: u8) -> Option<&'static str> {
    let name = match opcode {
        HLT => "HLT",
        RET => "RET",
        PUSH => "PUSH",
        POP => "POP",
        PRN => "PRN",
        CALL => "CALL",
        JMP => "JMP",
        JEQ => "JEQ",
        JNE => "JNE",
        JGT => "JGT",
        JLT => "JLT",
        LDI => "LDI",
        ADD => "ADD",
        SUB => "SUB",
        MUL => "MUL",
        DIV => "DIV",
        MOD => "MOD",
        CMP => "CMP",
        _ => return None,
    };
    Some(name)
}

// --- handlers ---

fn op_hlt(cpu: &mut Cpu, _: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    cpu.halt();
    Ok(())
}

fn op_ldi(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let reg = cpu.operand(1)?;
    let val = cpu.operand(2)?;
    let next = cpu.next_pc(opcode)?;
    cpu.set_reg(reg, val)?;
    cpu.pc = next;
    Ok(())
}

fn op_prn(cpu: &mut Cpu, opcode: u8, out: &mut dyn Write) -> Result<(), CpuError> {
    let val = cpu.reg(cpu.operand(1)?)?;
    let next = cpu.next_pc(opcode)?;
    writeln!(out, "{}", val)?;
    cpu.pc = next;
    Ok(())
}

fn op_alu(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let op = AluOp::try_from(opcode)?;
    let reg_a = cpu.operand(1)?;
    let reg_b = cpu.operand(2)?;
    let next = cpu.next_pc(opcode)?;
    cpu.alu(op, reg_a, reg_b)?;
    cpu.pc = next;
    Ok(())
}

fn op_push(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let val = cpu.reg(cpu.operand(1)?)?;
    let next = cpu.next_pc(opcode)?;
    cpu.push(val)?;
    cpu.pc = next;
    Ok(())
}

fn op_pop(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let reg = cpu.operand(1)?;
    // validate the target before moving SP
    cpu.reg(reg)?;
    let next = cpu.next_pc(opcode)?;
    let val = cpu.pop()?;
    cpu.set_reg(reg, val)?;
    cpu.pc = next;
    Ok(())
}

fn op_call(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let target = cpu.reg(cpu.operand(1)?)?;
    let ret = cpu.next_pc(opcode)?;
    cpu.push(ret)?;
    cpu.pc = target;
    Ok(())
}

fn op_ret(cpu: &mut Cpu, _: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    cpu.pc = cpu.pop()?;
    Ok(())
}

fn jump_to_operand_reg(cpu: &mut Cpu) -> Result<(), CpuError> {
    cpu.pc = cpu.reg(cpu.operand(1)?)?;
    Ok(())
}

fn op_jmp(cpu: &mut Cpu, _: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    jump_to_operand_reg(cpu)
}

fn jump_if(cpu: &mut Cpu, opcode: u8, taken: bool) -> Result<(), CpuError> {
    if taken {
        jump_to_operand_reg(cpu)
    } else {
        cpu.pc = cpu.next_pc(opcode)?;
        Ok(())
    }
}

fn op_jeq(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let taken = cpu.flag(FL_EQ);
    jump_if(cpu, opcode, taken)
}

fn op_jne(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let taken = !cpu.flag(FL_EQ);
    jump_if(cpu, opcode, taken)
}

fn op_jgt(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let taken = cpu.flag(FL_GT);
    jump_if(cpu, opcode, taken)
}

fn op_jlt(cpu: &mut Cpu, opcode: u8, _: &mut dyn Write) -> Result<(), CpuError> {
    let taken = cpu.flag(FL_LT);
    jump_if(cpu, opcode, taken)
}
