//! Synthetic ROM images for tests.

use crate::rom::{ROM_BASE, RomImage};
use crate::scan::parse_pattern;

/// Builder that lays out signatures, tables and filler runs in a ROM image.
pub struct MockRomBuilder {
    bytes: Vec<u8>,
}

impl MockRomBuilder {
    /// Zero-filled image of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub fn fill(mut self, offset: usize, len: usize, value: u8) -> Self {
        self.bytes[offset..offset + len].fill(value);
        self
    }

    pub fn bytes(mut self, offset: usize, data: &[u8]) -> Self {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self
    }

    /// Write a hex signature (`"00 B5 ..."`); wildcards become zero.
    pub fn signature(self, offset: usize, pattern: &str) -> Self {
        let data: Vec<u8> = parse_pattern(pattern)
            .expect("valid test pattern")
            .into_iter()
            .map(|b| b.unwrap_or(0))
            .collect();
        self.bytes(offset, &data)
    }

    pub fn u32(self, offset: usize, value: u32) -> Self {
        self.bytes(offset, &value.to_le_bytes())
    }

    /// Cartridge pointer to `target` file offset.
    pub fn pointer(self, offset: usize, target: usize) -> Self {
        self.u32(offset, ROM_BASE + target as u32)
    }

    /// Consecutive 8-byte song records starting at `offset`.
    pub fn song_table(mut self, offset: usize, records: &[[u8; 8]]) -> Self {
        for (i, record) in records.iter().enumerate() {
            self = self.bytes(offset + i * 8, record);
        }
        self
    }

    pub fn build(self) -> RomImage {
        RomImage::from_bytes(self.bytes).expect("mock ROM within size limit")
    }
}

/// A song record whose type nibble marks it valid.
pub fn song_record(id: u8) -> [u8; 8] {
    [id, 0x10, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00]
}
