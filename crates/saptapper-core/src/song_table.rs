//! Song table analysis.

use std::collections::BTreeSet;

use crate::scan::constants::{
    SONG_RECORD_SIZE, SONG_RECORD_TYPE_BYTE, SONG_RECORD_TYPE_MASK, SONG_RECORD_TYPE_SONG,
};

/// One raw 8-byte song-table record. Equality is byte-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SongDescriptor([u8; SONG_RECORD_SIZE]);

impl SongDescriptor {
    pub fn new(bytes: [u8; SONG_RECORD_SIZE]) -> Self {
        Self(bytes)
    }

    /// Read the record at `offset`, if it lies entirely inside `rom`.
    pub fn read(rom: &[u8], offset: usize) -> Option<Self> {
        let end = offset.checked_add(SONG_RECORD_SIZE)?;
        let bytes = rom.get(offset..end)?;
        Some(Self(bytes.try_into().ok()?))
    }

    /// Whether the type nibble marks a song entry.
    pub fn is_song(&self) -> bool {
        self.0[SONG_RECORD_TYPE_BYTE] & SONG_RECORD_TYPE_MASK == SONG_RECORD_TYPE_SONG
    }

    pub fn as_bytes(&self) -> &[u8; SONG_RECORD_SIZE] {
        &self.0
    }
}

/// The song table as seen from the select-song routine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongTable {
    offset: usize,
    descriptors: Vec<SongDescriptor>,
    duplicates: BTreeSet<usize>,
}

impl SongTable {
    /// Walk records from `offset` until the first one that is not a song,
    /// flagging every record identical to an earlier one.
    pub fn analyze(rom: &[u8], offset: usize) -> Self {
        let mut table = Self {
            offset,
            ..Default::default()
        };

        let mut cursor = offset;
        while let Some(descriptor) = SongDescriptor::read(rom, cursor) {
            if !descriptor.is_song() {
                break;
            }
            let index = table.descriptors.len();
            if table.descriptors.contains(&descriptor) {
                table.duplicates.insert(index);
            }
            table.descriptors.push(descriptor);
            cursor += SONG_RECORD_SIZE;
        }

        table
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total number of entries, duplicates included.
    pub fn song_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[SongDescriptor] {
        &self.descriptors
    }

    pub fn duplicates(&self) -> &BTreeSet<usize> {
        &self.duplicates
    }

    pub fn is_duplicate(&self, index: usize) -> bool {
        self.duplicates.contains(&index)
    }

    /// Indices that get their own track variant.
    pub fn unique_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.song_count()).filter(|i| !self.is_duplicate(*i))
    }
}
