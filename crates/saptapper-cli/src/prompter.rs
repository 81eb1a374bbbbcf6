//! Terminal implementation of ManualOverrideProvider

use anyhow::{Result, bail};
use saptapper_core::{ManualOverrideProvider, Phase};
use std::io::{self, BufRead, Write};

/// Asks the user on stdin for offsets the scanner could not find
pub struct CliPrompter;

impl CliPrompter {
    fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl ManualOverrideProvider for CliPrompter {
    fn request_offset(&self, phase: Phase) -> Option<u32> {
        let routine = phase.routine()?;
        loop {
            let line = self.read_line(&format!(
                "Enter the file offset of {} in hex (blank to skip): ",
                routine
            ))?;
            if line.is_empty() {
                return None;
            }
            match parse_hex_offset(&line) {
                Ok(0) => return None,
                Ok(offset) => return Some(offset),
                Err(e) => eprintln!("{}, please try again", e),
            }
        }
    }

    fn request_credit(&self) -> Option<String> {
        let name = self.read_line("Name to credit for the offsets (blank to skip): ")?;
        (!name.is_empty()).then_some(name)
    }
}

/// Parse a hex file offset (with or without 0x prefix).
pub fn parse_hex_offset(s: &str) -> Result<u32> {
    let digits = s
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    if digits.is_empty() {
        bail!("Invalid hex offset: empty");
    }
    u32::from_str_radix(digits, 16).map_err(|e| anyhow::anyhow!("Invalid hex offset: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_offset_with_prefix() {
        assert_eq!(parse_hex_offset("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_hex_offset("0X1000").unwrap(), 0x1000);
    }

    #[test]
    fn test_parse_hex_offset_without_prefix() {
        assert_eq!(parse_hex_offset("DFB").unwrap(), 0xDFB);
        assert_eq!(parse_hex_offset(" 7fffff \n").unwrap(), 0x7F_FFFF);
    }

    #[test]
    fn test_parse_hex_offset_invalid() {
        assert!(parse_hex_offset("GHIJK").is_err());
        assert!(parse_hex_offset("0x").is_err());
        assert!(parse_hex_offset("1_0000_0000").is_err());
        assert!(parse_hex_offset("100000000").is_err());
    }
}
