//! Turns `.ls8` program text into the byte image the CPU loads.
//!
//! Each line holds one binary literal such as `10000010`, optionally followed
//! by a `#` comment. Blank and comment-only lines are skipped.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use log::debug;
use memmap2::Mmap;

use crate::error::ParseError;

pub fn parse_program(text: &str) -> Result<Vec<u8>, ParseError> {
    let mut program = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let code = raw.split('#').next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }
        let byte = code
            .bytes()
            .all(|c| c == b'0' || c == b'1')
            .then(|| u8::from_str_radix(code, 2).ok())
            .flatten()
            .ok_or_else(|| ParseError::InvalidLiteral {
                line: idx + 1,
                text: code.to_string(),
            })?;
        program.push(byte);
    }
    Ok(program)
}

/// Reads and parses a program file through a read-only memory map.
pub fn load_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("cannot stat {}", path.display()))?
        .len();
    // zero-length files cannot be mapped on every platform
    if len == 0 {
        return Ok(Vec::new());
    }
    // SAFETY: the map is read-only and dropped before this function returns.
    // Program files are assumed not to be truncated or rewritten by another
    // process while mapped; that would fault (SIGBUS) on access.
    let map = unsafe { Mmap::map(&file) }.with_context(|| format!("cannot map {}", path.display()))?;
    let text = std::str::from_utf8(&map).with_context(|| format!("{} is not UTF-8", path.display()))?;
    let program = parse_program(text).with_context(|| format!("cannot parse {}", path.display()))?;
    debug!("parsed {} bytes from {}", program.len(), path.display());
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{Cpu, ExitStatus};
    use std::io::Write;

    fn run_demo(text: &str) -> String {
        let program = parse_program(text).expect("demo should parse");
        let mut cpu = Cpu::with_program(&program).expect("demo should fit");
        let mut out: Vec<u8> = Vec::new();
        assert_eq!(cpu.run(&mut out).unwrap(), ExitStatus::Halted);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# print8\n\n10000010 # LDI R0,8\n00000000\n00001000\n   \n01000111\n00000000\n00000001 # HLT\n";
        assert_eq!(
            parse_program(text).unwrap(),
            vec![0x82, 0x00, 0x08, 0x47, 0x00, 0x01]
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_program("10000010\n00000000\n0000201\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLiteral {
                line: 3,
                text: "0000201".to_string()
            }
        );
        assert!(parse_program("111111111\n").is_err(), "nine ones do not fit a byte");
        assert!(parse_program("+0000001\n").is_err());
    }

    #[test]
    fn test_demo_print8() {
        assert_eq!(run_demo(include_str!("../demos/print8.ls8")), "8\n");
    }

    #[test]
    fn test_demo_mult() {
        assert_eq!(run_demo(include_str!("../demos/mult.ls8")), "72\n");
    }

    #[test]
    fn test_demo_stack() {
        assert_eq!(run_demo(include_str!("../demos/stack.ls8")), "2\n4\n1\n");
    }

    #[test]
    fn test_demo_call() {
        assert_eq!(run_demo(include_str!("../demos/call.ls8")), "20\n30\n36\n60\n");
    }

    #[test]
    fn test_demo_sctest() {
        assert_eq!(run_demo(include_str!("../demos/sctest.ls8")), "1\n4\n5\n");
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("ls8-loader-{}.ls8", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(include_bytes!("../demos/print8.ls8")).unwrap();
        drop(file);

        let program = load_file(&path).unwrap();
        assert_eq!(program, vec![0x82, 0x00, 0x08, 0x47, 0x00, 0x01]);
        std::fs::remove_file(&path).unwrap();

        assert!(load_file(&path).is_err(), "a missing file should be an error");
    }
}
