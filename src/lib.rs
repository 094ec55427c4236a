//! LS-8: an 8-bit byte-code machine with 256 bytes of memory and eight
//! registers.

pub mod alu;
pub mod cpu;
pub mod error;
pub mod isa;
pub mod loader;
pub mod reg;
pub mod snapshot;

pub use cpu::{Cpu, ExitStatus, RunLimits, MEMORY_SIZE};
pub use error::{CpuError, ParseError};
pub use snapshot::Snapshot;
