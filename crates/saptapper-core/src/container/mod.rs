//! The compressed sound-format container (`.gsflib` / `.minigsf`).
//!
//! All integers are little-endian:
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 3    | `PSF` signature                          |
//! | 3      | 1    | format version (`0x22` selects GSF)      |
//! | 4      | 4    | compressed payload length                |
//! | 8      | 4    | CRC-32 of the compressed payload         |
//! | 12     | 4    | uncompressed payload length              |
//! | 16     | N    | zlib-compressed payload                  |
//! | 16+N   | 5    | `[TAG]`, only when tags are present      |
//! | ...    | var  | `key=value\n` lines                      |

mod exe;
mod reader;
mod tags;
mod writer;

use crc::Crc;

pub use exe::*;
pub use reader::*;
pub use tags::Tags;
pub use writer::{ContainerInfo, ContainerWriter};

pub const PSF_SIGNATURE: &[u8; 3] = b"PSF";
pub const GSF_VERSION: u8 = 0x22;
pub const TAG_SIGNATURE: &[u8; 5] = b"[TAG]";
pub const HEADER_SIZE: usize = 16;
/// Output buffer size for the deflate stream.
pub const CHUNK_SIZE: usize = 16 * 1024;

pub static CHECKSUM: Crc<u32> = Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);
