use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("sappy_selectsongbynum not found")]
    NoSelectSong,

    #[error("sappy_main not found")]
    NoSoundMain,

    #[error("sappy_init not found")]
    NoSoundInit,

    #[error("sappy_vsync not found")]
    NoVSync,

    #[error("Insufficient space found")]
    InsufficientSpace,

    #[error("Executable too large: {size} bytes (maximum {max})")]
    ExecutableTooLarge { size: u64, max: u64 },

    #[error("File read error: {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File write error: {}: {source}", path.display())]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    #[error("Address out of ROM range: {0:#010x}")]
    AddressOutOfRange(u32),

    #[error("Value {value:#x} does not fit in {width} bytes")]
    ValueOutOfRange { value: u64, width: usize },

    #[error("All {failed} track variant(s) failed")]
    VariantsFailed { failed: usize },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this failure came from a signature scan phase and may be
    /// resolved by a manually supplied offset.
    pub fn is_scan_failure(&self) -> bool {
        matches!(
            self,
            Error::NoSelectSong | Error::NoSoundMain | Error::NoSoundInit | Error::NoVSync
        )
    }

    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(e) | Error::FileReadError { source: e, .. } => {
                e.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}
