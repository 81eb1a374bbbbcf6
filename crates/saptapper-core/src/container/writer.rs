use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use flate2::{Compress, Compression, FlushCompress, Status};
use tracing::debug;

use crate::container::{
    CHECKSUM, CHUNK_SIZE, GSF_VERSION, HEADER_SIZE, PSF_SIGNATURE, TAG_SIGNATURE, Tags,
};
use crate::error::{Error, Result};
use crate::rom::MAX_EXE_SIZE;

/// Sizes and checksum recorded in a written header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub compressed_len: u32,
    pub crc: u32,
    pub uncompressed_len: u32,
}

/// Writes compressed sound-format containers.
#[derive(Debug, Clone, Copy)]
pub struct ContainerWriter {
    version: u8,
    level: Compression,
}

impl Default for ContainerWriter {
    fn default() -> Self {
        Self {
            version: GSF_VERSION,
            level: Compression::default(),
        }
    }
}

impl ContainerWriter {
    /// Write `payload` and `tags` to a new file at `path`.
    ///
    /// A failure part way through leaves the partial file in place.
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        payload: &[u8],
        tags: &Tags,
    ) -> Result<ContainerInfo> {
        let path = path.as_ref();
        let write_error = |source| Error::FileWriteError {
            path: path.to_path_buf(),
            source,
        };

        check_size(payload)?;
        let file = File::create(path).map_err(write_error)?;
        let mut out = BufWriter::new(file);

        let info = self.write_to(&mut out, payload, tags).map_err(|e| match e {
            Error::Io(source) => write_error(source),
            other => other,
        })?;
        out.flush().map_err(write_error)?;

        debug!(
            "Wrote {} ({} -> {} bytes, crc {:08X})",
            path.display(),
            info.uncompressed_len,
            info.compressed_len,
            info.crc
        );
        Ok(info)
    }

    /// Write a container to any seekable sink positioned at its start.
    pub fn write_to<W: Write + Seek>(
        &self,
        out: &mut W,
        payload: &[u8],
        tags: &Tags,
    ) -> Result<ContainerInfo> {
        check_size(payload)?;

        // Lengths and checksum are patched in once the stream is complete.
        out.write_all(PSF_SIGNATURE)?;
        out.write_all(&[self.version])?;
        out.write_all(&[0u8; HEADER_SIZE - 4])?;

        let mut compress = Compress::new(self.level, true);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut digest = CHECKSUM.digest();

        loop {
            let consumed = compress.total_in() as usize;
            let produced_before = compress.total_out();
            let status = compress
                .compress(&payload[consumed..], &mut chunk, FlushCompress::Finish)
                .map_err(|e| Error::CompressionError(e.to_string()))?;
            let produced = (compress.total_out() - produced_before) as usize;

            if produced != 0 {
                out.write_all(&chunk[..produced])?;
                digest.update(&chunk[..produced]);
            }

            match status {
                Status::StreamEnd => break,
                Status::Ok => {}
                Status::BufError => {
                    if produced == 0 && compress.total_in() as usize == consumed {
                        return Err(Error::CompressionError(
                            "deflate stream made no progress".to_string(),
                        ));
                    }
                }
            }
        }

        let info = ContainerInfo {
            compressed_len: u32::try_from(compress.total_out())
                .map_err(|_| Error::CompressionError("compressed stream too long".to_string()))?,
            crc: digest.finalize(),
            uncompressed_len: payload.len() as u32,
        };

        out.seek(SeekFrom::Start(4))?;
        out.write_all(&info.compressed_len.to_le_bytes())?;
        out.write_all(&info.crc.to_le_bytes())?;
        out.write_all(&info.uncompressed_len.to_le_bytes())?;
        out.seek(SeekFrom::End(0))?;

        if !tags.is_empty() {
            out.write_all(TAG_SIGNATURE)?;
            tags.write_lines(out)?;
        }

        Ok(info)
    }
}

fn check_size(payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_EXE_SIZE {
        return Err(Error::ExecutableTooLarge {
            size: payload.len() as u64,
            max: MAX_EXE_SIZE as u64,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::read_container;
    use std::io::{Cursor, Read};

    fn sample_payload() -> Vec<u8> {
        (0..100_000u32).flat_map(|i| (i % 251).to_le_bytes()).collect()
    }

    #[test]
    fn test_header_layout() {
        let payload = sample_payload();
        let mut out = Cursor::new(Vec::new());
        let info = ContainerWriter::default()
            .write_to(&mut out, &payload, &Tags::new())
            .unwrap();
        let bytes = out.into_inner();

        assert_eq!(&bytes[0..3], b"PSF");
        assert_eq!(bytes[3], 0x22);
        assert_eq!(
            u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            info.compressed_len
        );
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), info.crc);
        assert_eq!(
            u32::from_le_bytes(bytes[12..16].try_into().unwrap()),
            payload.len() as u32
        );
        assert_eq!(bytes.len(), HEADER_SIZE + info.compressed_len as usize);
    }

    #[test]
    fn test_payload_decompresses_and_checksum_matches() {
        let payload = sample_payload();
        let mut out = Cursor::new(Vec::new());
        let info = ContainerWriter::default()
            .write_to(&mut out, &payload, &Tags::new())
            .unwrap();
        let bytes = out.into_inner();
        let compressed = &bytes[HEADER_SIZE..HEADER_SIZE + info.compressed_len as usize];

        assert_eq!(CHECKSUM.checksum(compressed), info.crc);

        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(compressed)
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_tag_section() {
        let tags: Tags = [("_lib", "rom.gsflib"), ("comment", "a\nb")]
            .into_iter()
            .collect();
        let mut out = Cursor::new(Vec::new());
        let info = ContainerWriter::default()
            .write_to(&mut out, &[1, 2, 3, 4], &tags)
            .unwrap();
        let bytes = out.into_inner();
        let tail = &bytes[HEADER_SIZE + info.compressed_len as usize..];
        assert_eq!(tail, b"[TAG]_lib=rom.gsflib\ncomment=a\ncomment=b\n");
    }

    #[test]
    fn test_empty_payload() {
        let mut out = Cursor::new(Vec::new());
        let info = ContainerWriter::default()
            .write_to(&mut out, &[], &Tags::new())
            .unwrap();
        assert_eq!(info.uncompressed_len, 0);
        assert!(info.compressed_len > 0);
    }

    #[test]
    fn test_write_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.gsflib");
        let payload = sample_payload();
        let tags: Tags = [("gsfby", "Saptapper")].into_iter().collect();

        let info = ContainerWriter::default()
            .write(&path, &payload, &tags)
            .unwrap();
        let container = read_container(&path).unwrap();
        assert_eq!(container.version, GSF_VERSION);
        assert_eq!(container.crc, info.crc);
        assert_eq!(container.payload, payload);
        assert_eq!(container.tags, tags);
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.minigsf");
        let result = ContainerWriter::default().write(&path, &[0; 16], &Tags::new());
        assert!(matches!(result, Err(Error::FileWriteError { .. })));
    }

    #[test]
    fn test_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_EXE_SIZE + 1];
        let mut out = Cursor::new(Vec::new());
        let result = ContainerWriter::default().write_to(&mut out, &payload, &Tags::new());
        assert!(matches!(result, Err(Error::ExecutableTooLarge { .. })));
        assert!(out.into_inner().is_empty());
    }
}
