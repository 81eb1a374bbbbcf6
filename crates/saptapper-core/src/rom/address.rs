//! Cartridge address <-> file offset translation.
//!
//! Code inside the cartridge refers to ROM bytes through the bus mapping at
//! [`ROM_BASE`]; the image on disk starts at offset zero.

use std::fmt;

use crate::error::{Error, Result};

/// Load address of the cartridge ROM on the bus.
pub const ROM_BASE: u32 = 0x0800_0000;

/// An address tagged with the space it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Cartridge(u32),
    FileOffset(u32),
}

impl Address {
    /// Resolve to a file offset, translating cartridge addresses.
    pub fn to_offset(self) -> Result<u32> {
        match self {
            Address::Cartridge(addr) => to_offset(addr),
            Address::FileOffset(offset) => Ok(offset),
        }
    }

    /// Resolve to a cartridge address, translating file offsets.
    pub fn to_cartridge(self) -> Result<u32> {
        match self {
            Address::Cartridge(addr) => Ok(addr),
            Address::FileOffset(offset) => to_address(offset),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Cartridge(addr) => write!(f, "0x{:08X}", addr),
            Address::FileOffset(offset) => write!(f, "+0x{:X}", offset),
        }
    }
}

/// Convert a cartridge address into a file offset.
pub fn to_offset(addr: u32) -> Result<u32> {
    addr.checked_sub(ROM_BASE)
        .ok_or(Error::AddressOutOfRange(addr))
}

/// Convert a file offset into a cartridge address.
pub fn to_address(offset: u32) -> Result<u32> {
    offset
        .checked_add(ROM_BASE)
        .ok_or(Error::AddressOutOfRange(offset))
}
