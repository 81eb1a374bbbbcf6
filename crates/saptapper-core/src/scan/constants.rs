//! Scan geometry for the sound engine
//!
//! # Search Strategy
//!
//! The select-song routine is the anchor: it is the longest signature and
//! carries a literal pointer to the song table. The remaining engine entry
//! points are found by walking backwards from it, because the engine's
//! object code is always linked in the same order.
//!
//! ```text
//!   VSync <-- 0x800 -- Init <-- 0x100 -- Main <-- 0x20 -- SelectSong
//!                                                             | +40
//!                                                             v
//!                                                         SongTable
//! ```

/// Offset of the song-table pointer from the select-song match.
pub const SONG_TABLE_POINTER: usize = 40;

/// Size of one song-table record.
pub const SONG_RECORD_SIZE: usize = 8;
/// Byte within a record holding the type nibble.
pub const SONG_RECORD_TYPE_BYTE: usize = 3;
pub const SONG_RECORD_TYPE_MASK: u8 = 0x0E;
pub const SONG_RECORD_TYPE_SONG: u8 = 0x08;

/// Backward window from select-song to sound-main.
pub const SOUND_MAIN_WINDOW: usize = 0x20;
/// Backward window from sound-main to sound-init.
pub const SOUND_INIT_WINDOW: usize = 0x100;
/// Backward window from sound-init to vsync.
pub const VSYNC_WINDOW: usize = 0x800;
/// The vsync signature skips the routine's first instructions.
pub const VSYNC_PROLOGUE: usize = 5;

/// Unprogrammed bytes needed to host the patch block.
pub const FREE_SPACE_RUN: usize = 0x200;
pub const FREE_SPACE_ALIGNMENT: usize = 4;
/// Filler values tried, in order.
pub const FREE_SPACE_FILLERS: [u8; 2] = [0xFF, 0x00];

/// Placement of the patch block inside the free run.
pub const PATCH_BLOCK_OFFSET: usize = 0x108;
/// Track selector word, relative to the free run.
pub const TRACK_SELECTOR_OFFSET: usize = 0x1FC;
