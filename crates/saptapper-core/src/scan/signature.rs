use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::scan::Pattern;

pub const SELECT_SONG: &str = "selectSong";
pub const SOUND_MAIN: &str = "soundMain";
pub const SOUND_INIT: &str = "soundInit";
pub const VSYNC: &str = "vsync";

/// A named byte signature, stored as hex text so sets can live in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    /// Alternative encodings of the routine; the first to match wins.
    pub candidates: Vec<String>,
    /// Mismatched bytes tolerated per attempt.
    #[serde(default)]
    pub tolerance: usize,
}

impl Signature {
    pub fn new(name: &str, candidates: &[&str], tolerance: usize) -> Self {
        Self {
            name: name.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            tolerance,
        }
    }

    pub fn compile(&self) -> Result<Pattern> {
        let candidates = self
            .candidates
            .iter()
            .map(|c| parse_pattern(c))
            .collect::<Result<Vec<_>>>()?;
        Pattern::new(candidates, self.tolerance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSet {
    pub version: String,
    pub entries: Vec<Signature>,
}

impl SignatureSet {
    pub fn entry(&self, name: &str) -> Option<&Signature> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Look up and compile a named signature.
    pub fn pattern(&self, name: &str) -> Result<Pattern> {
        let entry = self.entry(name).ok_or_else(|| {
            Error::InvalidSignature(format!("Signature entry '{}' not found", name))
        })?;
        entry.compile()
    }

    /// Compile every entry the ripper needs, so a broken set fails up front.
    pub fn validate(&self) -> Result<()> {
        for name in [SELECT_SONG, SOUND_MAIN, SOUND_INIT, VSYNC] {
            self.pattern(name)?;
        }
        Ok(())
    }
}

impl Default for SignatureSet {
    fn default() -> Self {
        builtin_signatures()
    }
}

/// Signatures of the stock sound engine.
pub fn builtin_signatures() -> SignatureSet {
    SignatureSet {
        version: "builtin".to_string(),
        entries: vec![
            // PUSH {LR}; LSLS R0,R0,#0x10; LDR R2,=...; LDR R1,=songtable; ... BL
            Signature::new(
                SELECT_SONG,
                &["00 B5 00 04 07 4A 08 49 40 0B 40 18 83 88 59 00 \
                   C9 18 89 00 89 18 0A 68 01 68 10 1C 00 F0"],
                7,
            ),
            // PUSH {LR}
            Signature::new(SOUND_MAIN, &["00 B5"], 0),
            // PUSH {R4-R6,LR} or PUSH {R4-R7,LR}
            Signature::new(SOUND_INIT, &["70 B5", "F0 B5"], 0),
            // Tail of LDR R0,[R0]; LDR R2,=0x68736D53; LDR R3,[R0]; SUBS R3,R3,R2
            Signature::new(VSYNC, &["4A 03 68 9B 1A"], 0),
        ],
    }
}

pub fn load_signatures<P: AsRef<Path>>(path: P) -> Result<SignatureSet> {
    let content = fs::read_to_string(&path)?;
    let data: SignatureSet = serde_json::from_str(&content)?;
    data.validate()?;
    Ok(data)
}

pub fn save_signatures<P: AsRef<Path>>(path: P, signatures: &SignatureSet) -> Result<()> {
    let content = serde_json::to_string_pretty(signatures)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn parse_pattern(pattern: &str) -> Result<Vec<Option<u8>>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        if token == "??" || token == "?" {
            bytes.push(None);
            continue;
        }

        let value = u8::from_str_radix(token, 16).map_err(|e| {
            Error::InvalidSignature(format!("Invalid signature token '{}': {}", token, e))
        })?;
        bytes.push(Some(value));
    }

    if bytes.is_empty() {
        return Err(Error::InvalidSignature(
            "Signature pattern is empty".to_string(),
        ));
    }

    Ok(bytes)
}

pub fn format_pattern(bytes: &[Option<u8>]) -> String {
    bytes
        .iter()
        .map(|b| match b {
            Some(value) => format!("{:02X}", value),
            None => "??".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern_with_wildcards() {
        let bytes = parse_pattern("00 B5 ?? 04").unwrap();
        assert_eq!(bytes, vec![Some(0x00), Some(0xB5), None, Some(0x04)]);
    }

    #[test]
    fn test_parse_pattern_rejects_garbage() {
        assert!(parse_pattern("").is_err());
        assert!(parse_pattern("00 XY").is_err());
    }

    #[test]
    fn test_format_pattern_roundtrip() {
        let pattern = vec![Some(0x4A), Some(0x03), None, Some(0x9B)];
        let formatted = format_pattern(&pattern);
        assert_eq!(formatted, "4A 03 ?? 9B");
        assert_eq!(parse_pattern(&formatted).unwrap(), pattern);
    }

    #[test]
    fn test_builtin_signatures_compile() {
        let set = builtin_signatures();
        set.validate().unwrap();
        assert_eq!(set.pattern(SELECT_SONG).unwrap().len(), 0x1E);
        assert_eq!(set.pattern(SELECT_SONG).unwrap().tolerance(), 7);
        assert_eq!(set.pattern(SOUND_INIT).unwrap().candidates().len(), 2);
    }

    #[test]
    fn test_entry_lookup_is_case_insensitive() {
        let set = builtin_signatures();
        assert!(set.entry("VSYNC").is_some());
        assert!(matches!(
            set.pattern("sappy_missing"),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_save_and_load_signatures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatures.json");
        let mut set = builtin_signatures();
        set.version = "custom".to_string();
        save_signatures(&path, &set).unwrap();
        assert_eq!(load_signatures(&path).unwrap(), set);
    }

    #[test]
    fn test_load_rejects_incomplete_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatures.json");
        let set = SignatureSet {
            version: "partial".to_string(),
            entries: vec![Signature::new(SOUND_MAIN, &["00 B5"], 0)],
        };
        save_signatures(&path, &set).unwrap();
        assert!(matches!(
            load_signatures(&path),
            Err(Error::InvalidSignature(_))
        ));
    }
}
