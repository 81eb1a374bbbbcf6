use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;

use crate::container::{CHECKSUM, HEADER_SIZE, PSF_SIGNATURE, TAG_SIGNATURE, Tags};
use crate::error::{Error, Result};

/// A decoded container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub version: u8,
    pub crc: u32,
    pub payload: Vec<u8>,
    pub tags: Tags,
}

pub fn read_container<P: AsRef<Path>>(path: P) -> Result<Container> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::FileReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_container(&bytes)
}

/// Decode a container, verifying its checksum and declared lengths.
pub fn parse_container(bytes: &[u8]) -> Result<Container> {
    if bytes.len() < HEADER_SIZE || &bytes[0..3] != PSF_SIGNATURE {
        return Err(Error::InvalidContainer("missing PSF signature".to_string()));
    }
    let field = |at: usize| {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    };
    let version = bytes[3];
    let compressed_len = field(4) as usize;
    let crc = field(8);
    let uncompressed_len = field(12) as usize;

    let compressed = bytes
        .get(HEADER_SIZE..HEADER_SIZE + compressed_len)
        .ok_or_else(|| Error::InvalidContainer("truncated payload".to_string()))?;
    let actual = CHECKSUM.checksum(compressed);
    if actual != crc {
        return Err(Error::InvalidContainer(format!(
            "CRC mismatch: header {:08X}, payload {:08X}",
            crc, actual
        )));
    }

    let mut payload = Vec::with_capacity(uncompressed_len);
    ZlibDecoder::new(compressed)
        .read_to_end(&mut payload)
        .map_err(|e| Error::InvalidContainer(format!("corrupt payload: {}", e)))?;
    if payload.len() != uncompressed_len {
        return Err(Error::InvalidContainer(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            uncompressed_len
        )));
    }

    let rest = &bytes[HEADER_SIZE + compressed_len..];
    let tags = match rest.strip_prefix(TAG_SIGNATURE.as_slice()) {
        Some(text) => Tags::parse(&String::from_utf8_lossy(text)),
        None => Tags::new(),
    };

    Ok(Container {
        version,
        crc,
        payload,
        tags,
    })
}
