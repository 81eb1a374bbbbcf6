//! Free-space search for the patch block.

use crate::error::{Error, Result};
use crate::scan::constants::{FREE_SPACE_ALIGNMENT, FREE_SPACE_FILLERS, FREE_SPACE_RUN};

/// First `alignment`-aligned start offset of `run_length` bytes all equal to
/// `filler`.
pub fn find_run(haystack: &[u8], filler: u8, run_length: usize, alignment: usize) -> Option<usize> {
    if run_length == 0 || run_length > haystack.len() {
        return None;
    }
    let step = alignment.max(1);
    let last = haystack.len() - run_length;

    let mut pos = 0;
    while pos <= last {
        match haystack[pos..pos + run_length]
            .iter()
            .rposition(|&b| b != filler)
        {
            None => return Some(pos),
            // Every aligned start up to the offending byte also covers it.
            Some(bad) => pos = (pos + bad + 1).next_multiple_of(step),
        }
    }
    None
}

/// A located free region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeSpace {
    pub offset: usize,
    pub filler: u8,
}

/// Find room for the patch block, preferring erased-flash filler.
pub fn locate_patch_space(haystack: &[u8]) -> Result<FreeSpace> {
    FREE_SPACE_FILLERS
        .iter()
        .find_map(|&filler| {
            find_run(haystack, filler, FREE_SPACE_RUN, FREE_SPACE_ALIGNMENT)
                .map(|offset| FreeSpace { offset, filler })
        })
        .ok_or(Error::InsufficientSpace)
}
