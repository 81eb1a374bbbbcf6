//! Cartridge ROM images.

pub mod address;
#[cfg(test)]
pub mod mock;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

pub use address::{Address, ROM_BASE, to_address, to_offset};
#[cfg(test)]
pub use mock::MockRomBuilder;

/// Largest program a container may carry (mini-header included).
pub const MAX_EXE_SIZE: usize = 32 * 1024 * 1024;
/// Size of the load header that precedes the program bytes.
pub const EXE_HEADER_SIZE: usize = 12;
/// Largest ROM image accepted.
pub const MAX_ROM_SIZE: usize = MAX_EXE_SIZE - EXE_HEADER_SIZE;

/// An owned, capacity-limited ROM image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomImage {
    bytes: Vec<u8>,
}

impl RomImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(Error::ExecutableTooLarge {
                size: bytes.len() as u64,
                max: MAX_ROM_SIZE as u64,
            });
        }
        Ok(Self { bytes })
    }

    /// Read a ROM file, rejecting oversized images before loading them.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let read_error = |source| Error::FileReadError {
            path: path.to_path_buf(),
            source,
        };

        let size = fs::metadata(path).map_err(read_error)?.len();
        if size > MAX_ROM_SIZE as u64 {
            return Err(Error::ExecutableTooLarge {
                size,
                max: MAX_ROM_SIZE as u64,
            });
        }

        let bytes = fs::read(path).map_err(read_error)?;
        debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        let end = offset.checked_add(4)?;
        let bytes = self.bytes.get(offset..end)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Overwrite `data.len()` bytes at `offset`.
    pub fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let out_of_range = || Error::AddressOutOfRange(offset as u32);
        let end = offset.checked_add(data.len()).ok_or_else(out_of_range)?;
        let target = self.bytes.get_mut(offset..end).ok_or_else(out_of_range)?;
        target.copy_from_slice(data);
        Ok(())
    }

    /// Container program: load header followed by the ROM bytes.
    pub fn to_exe(&self) -> Vec<u8> {
        let mut exe = Vec::with_capacity(EXE_HEADER_SIZE + self.bytes.len());
        exe.extend_from_slice(&ROM_BASE.to_le_bytes());
        exe.extend_from_slice(&ROM_BASE.to_le_bytes());
        exe.extend_from_slice(&(self.bytes.len() as u32).to_le_bytes());
        exe.extend_from_slice(&self.bytes);
        exe
    }
}

impl std::ops::Deref for RomImage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}
