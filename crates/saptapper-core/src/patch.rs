//! Sound driver patch assembly and injection.
//!
//! The driver block replaces the cartridge's boot path: it initialises the
//! sound engine, selects the track named by the selector word at the end of
//! the block and then services the engine from the vblank interrupt.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::rom::{RomImage, to_address};
use crate::scan::constants::{PATCH_BLOCK_OFFSET, TRACK_SELECTOR_OFFSET};

#[rustfmt::skip]
pub const DRIVER_BLOCK: [u8; 248] = [
    0x00, 0x80, 0x2D, 0xE9, 0x01, 0x00, 0xBD, 0xE8, 0x50, 0x10, 0xA0, 0xE3, 0x00, 0x20, 0x90, 0xE5,
    0x04, 0x00, 0x80, 0xE2, 0x04, 0x10, 0x41, 0xE2, 0x00, 0x00, 0x51, 0xE3, 0xFA, 0xFF, 0xFF, 0x1A,
    0x0B, 0x00, 0x00, 0xEA, 0x53, 0x61, 0x70, 0x70, 0x79, 0x20, 0x44, 0x72, 0x69, 0x76, 0x65, 0x72,
    0x20, 0x52, 0x69, 0x70, 0x70, 0x65, 0x72, 0x20, 0x62, 0x79, 0x20, 0x43, 0x61, 0x69, 0x74, 0x53,
    0x69, 0x74, 0x68, 0x32, 0x5C, 0x5A, 0x6F, 0x6F, 0x70, 0x64, 0x2C, 0x20, 0x28, 0x63, 0x29, 0x20,
    0x32, 0x30, 0x30, 0x34, 0x00, 0x40, 0x2D, 0xE9, 0x80, 0x00, 0x9F, 0xE5, 0x21, 0x00, 0x00, 0xEB,
    0x88, 0x00, 0x9F, 0xE5, 0x00, 0x80, 0x2D, 0xE9, 0x02, 0x00, 0xBD, 0xE8, 0x30, 0x10, 0x81, 0xE2,
    0x00, 0x10, 0x80, 0xE5, 0x01, 0x03, 0xA0, 0xE3, 0x08, 0x10, 0xA0, 0xE3, 0x04, 0x10, 0x80, 0xE5,
    0x01, 0x10, 0xA0, 0xE3, 0x00, 0x12, 0x80, 0xE5, 0x08, 0x12, 0x80, 0xE5, 0x60, 0x00, 0x9F, 0xE5,
    0x40, 0x10, 0x9F, 0xE5, 0x14, 0x00, 0x00, 0xEB, 0x00, 0x00, 0x02, 0xEF, 0xFD, 0xFF, 0xFF, 0xEA,
    0x00, 0x40, 0x2D, 0xE9, 0x38, 0x00, 0x9F, 0xE5, 0x0E, 0x00, 0x00, 0xEB, 0x28, 0x00, 0x9F, 0xE5,
    0x0C, 0x00, 0x00, 0xEB, 0x01, 0x03, 0xA0, 0xE3, 0x01, 0x18, 0xA0, 0xE3, 0x01, 0x10, 0x81, 0xE2,
    0x00, 0x12, 0x80, 0xE5, 0x24, 0x00, 0x9F, 0xE5, 0x04, 0x10, 0x00, 0xE5, 0x01, 0x00, 0xBD, 0xE8,
    0x10, 0xFF, 0x2F, 0xE1, 0xFF, 0xFF, 0xFF, 0xFF, 0x59, 0x81, 0x03, 0x08, 0x4D, 0x81, 0x03, 0x08,
    0xD5, 0x80, 0x03, 0x08, 0x89, 0x7A, 0x03, 0x08, 0x10, 0xFF, 0x2F, 0xE1, 0x11, 0xFF, 0x2F, 0xE1,
    0xFC, 0x7F, 0x00, 0x03, 0x30, 0x00, 0x00, 0x00,
];

/// Where a slot's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    SelectSong,
    SoundMain,
    SoundInit,
    VSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSlot {
    pub offset: usize,
    pub width: usize,
    pub source: SlotSource,
}

/// File offsets of the located engine routines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntryPoints {
    pub select_song: usize,
    pub sound_main: usize,
    pub sound_init: usize,
    pub vsync: usize,
}

impl EntryPoints {
    /// Value stored for `source`: the routine's offset with the Thumb bit set.
    /// The template's high byte already holds the ROM bank.
    pub fn slot_value(&self, source: SlotSource) -> u64 {
        let offset = match source {
            SlotSource::SelectSong => self.select_song,
            SlotSource::SoundMain => self.sound_main,
            SlotSource::SoundInit => self.sound_init,
            SlotSource::VSync => self.vsync,
        };
        offset as u64 + 1
    }
}

/// An immutable code blob with address slots.
#[derive(Debug, Clone, Copy)]
pub struct PatchTemplate {
    blob: &'static [u8],
    slots: &'static [PatchSlot],
}

const DRIVER_SLOTS: [PatchSlot; 4] = [
    PatchSlot {
        offset: 0xD8,
        width: 3,
        source: SlotSource::SelectSong,
    },
    PatchSlot {
        offset: 0xDC,
        width: 3,
        source: SlotSource::SoundMain,
    },
    PatchSlot {
        offset: 0xE0,
        width: 3,
        source: SlotSource::SoundInit,
    },
    PatchSlot {
        offset: 0xE4,
        width: 3,
        source: SlotSource::VSync,
    },
];

impl PatchTemplate {
    pub const fn new(blob: &'static [u8], slots: &'static [PatchSlot]) -> Self {
        Self { blob, slots }
    }

    /// The stock sound driver block.
    pub const fn driver() -> Self {
        Self::new(&DRIVER_BLOCK, &DRIVER_SLOTS)
    }

    pub fn len(&self) -> usize {
        self.blob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blob.is_empty()
    }

    pub fn slots(&self) -> &[PatchSlot] {
        self.slots
    }

    /// Copy the blob and fill every slot.
    pub fn assemble<F>(&self, slot_value: F) -> Result<Vec<u8>>
    where
        F: Fn(SlotSource) -> u64,
    {
        let mut bytes = self.blob.to_vec();
        for slot in self.slots {
            write_le(&mut bytes, slot.offset, slot_value(slot.source), slot.width)?;
        }
        Ok(bytes)
    }
}

/// Write the low `width` bytes of `value` little-endian at `offset`.
pub fn write_le(buf: &mut [u8], offset: usize, value: u64, width: usize) -> Result<()> {
    if !(1..=8).contains(&width) || (width < 8 && value >> (width * 8) != 0) {
        return Err(Error::ValueOutOfRange { value, width });
    }
    let target = offset
        .checked_add(width)
        .and_then(|end| buf.get_mut(offset..end))
        .ok_or(Error::AddressOutOfRange(offset as u32))?;
    target.copy_from_slice(&value.to_le_bytes()[..width]);
    Ok(())
}

/// Where the driver ended up inside the ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatchPlacement {
    /// File offset of the driver block.
    pub block_offset: usize,
    /// Cartridge address of the track selector word.
    pub selector_address: u32,
}

/// Branch displacement of an ARM `B` at ROM offset 0 targeting `target`.
fn entry_branch(target: usize) -> Result<u64> {
    ((target >> 2) as u64)
        .checked_sub(2)
        .ok_or(Error::ValueOutOfRange {
            value: target as u64,
            width: 3,
        })
}

/// Place the assembled driver into the free run at `free_offset` and redirect
/// the boot branch to it.
pub fn inject(
    rom: &mut RomImage,
    template: &PatchTemplate,
    entry_points: &EntryPoints,
    free_offset: usize,
) -> Result<PatchPlacement> {
    let block = template.assemble(|source| entry_points.slot_value(source))?;
    let block_offset = free_offset + PATCH_BLOCK_OFFSET;
    rom.write_bytes(block_offset, &block)?;

    let mut branch = [0u8; 3];
    write_le(&mut branch, 0, entry_branch(block_offset)?, 3)?;
    rom.write_bytes(0, &branch)?;

    let selector_address = to_address((free_offset + TRACK_SELECTOR_OFFSET) as u32)?;
    debug!(
        "Driver placed at +0x{:X}, selector at 0x{:08X}",
        block_offset, selector_address
    );

    Ok(PatchPlacement {
        block_offset,
        selector_address,
    })
}
