use std::fmt;

use crate::reg::NUM_REGS;

/// Read-only view of the machine state taken before an instruction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub pc: u8,
    pub fl: u8,
    pub sp: u8,
    /// Memory at PC, PC+1 and PC+2. Cells past the end of memory read as 0.
    pub next: [u8; 3],
    pub regs: [u8; NUM_REGS],
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.pc, self.next[0], self.next[1], self.next[2]
        )?;
        for r in self.regs {
            write!(f, " {:02X}", r)?;
        }
        Ok(())
    }
}
