use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::patch::{EntryPoints, PatchPlacement};
use crate::rom::RomImage;
use crate::scan::FreeSpace;
use crate::song_table::SongTable;

/// Files produced for one ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub basename: String,
    pub dir: PathBuf,
    pub gsflib: PathBuf,
}

impl OutputPaths {
    /// `<root>/<name>/<name>.gsflib`, where `root` defaults to the ROM's directory.
    pub fn for_rom(rom_path: &Path, output_root: Option<&Path>) -> Result<Self> {
        let basename = rom_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::FileReadError {
                path: rom_path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            })?;

        let root = match output_root {
            Some(root) => root.to_path_buf(),
            None => rom_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let dir = root.join(&basename);
        let gsflib = dir.join(format!("{}.gsflib", basename));

        Ok(Self {
            basename,
            dir,
            gsflib,
        })
    }

    pub fn gsflib_name(&self) -> String {
        format!("{}.gsflib", self.basename)
    }

    /// `<name>.NNNN.minigsf` with a zero-padded hexadecimal track index.
    pub fn minigsf(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{:04X}.minigsf", self.basename, index))
    }
}

/// Per-variant outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantStats {
    pub written: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Everything one rip owns. Never shared between rips.
#[derive(Debug)]
pub struct Session {
    pub rom_path: PathBuf,
    pub rom: RomImage,
    pub output: OutputPaths,
    pub entry_points: EntryPoints,
    pub song_table: SongTable,
    pub free_space: Option<FreeSpace>,
    pub placement: Option<PatchPlacement>,
    /// Set once any phase accepted a manual offset.
    pub override_used: bool,
    /// Whether this session created `output.dir` (and so owns its cleanup).
    pub created_dir: bool,
    pub variants: VariantStats,
}

impl Session {
    pub fn new(rom_path: &Path, rom: RomImage, output: OutputPaths) -> Self {
        Self {
            rom_path: rom_path.to_path_buf(),
            rom,
            output,
            entry_points: EntryPoints::default(),
            song_table: SongTable::default(),
            free_space: None,
            placement: None,
            override_used: false,
            created_dir: false,
            variants: VariantStats::default(),
        }
    }

    pub fn duplicates(&self) -> &BTreeSet<usize> {
        self.song_table.duplicates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths_beside_rom() {
        let paths = OutputPaths::for_rom(Path::new("roms/game.gba"), None).unwrap();
        assert_eq!(paths.basename, "game");
        assert_eq!(paths.dir, Path::new("roms/game"));
        assert_eq!(paths.gsflib, Path::new("roms/game/game.gsflib"));
        assert_eq!(paths.minigsf(0x1A), Path::new("roms/game/game.001A.minigsf"));
    }

    #[test]
    fn test_output_paths_custom_root() {
        let paths = OutputPaths::for_rom(Path::new("game.gba"), Some(Path::new("out"))).unwrap();
        assert_eq!(paths.dir, Path::new("out/game"));
        assert_eq!(paths.gsflib_name(), "game.gsflib");
    }

    #[test]
    fn test_output_paths_need_file_name() {
        assert!(OutputPaths::for_rom(Path::new("/"), None).is_err());
    }
}
