//! Program images carried inside containers.

use crate::error::Result;
use crate::patch::write_le;
use crate::rom::{EXE_HEADER_SIZE, ROM_BASE};

/// Widest track selector a variant may carry.
pub const MAX_SELECTOR_WIDTH: usize = 4;

/// Bytes needed to hold every track index below `song_count`.
pub fn selector_width(song_count: usize) -> usize {
    if song_count == 0 {
        return 0;
    }
    let mut width = 1;
    let mut remaining = (song_count - 1) >> 8;
    while width < MAX_SELECTOR_WIDTH && remaining != 0 {
        width += 1;
        remaining >>= 8;
    }
    width
}

/// Program for a track variant: a load header targeting the selector word,
/// followed by the track index.
pub fn track_selector_exe(selector_address: u32, index: usize, width: usize) -> Result<Vec<u8>> {
    let mut exe = vec![0u8; EXE_HEADER_SIZE + width];
    write_le(&mut exe, 0, ROM_BASE as u64, 4)?;
    write_le(&mut exe, 4, selector_address as u64, 4)?;
    write_le(&mut exe, 8, width as u64, 4)?;
    if width > 0 {
        write_le(&mut exe, EXE_HEADER_SIZE, index as u64, width)?;
    }
    Ok(exe)
}
