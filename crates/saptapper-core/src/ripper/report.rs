use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ripper::Session;

/// Located offsets in hex string format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedOffsets {
    pub select_song: String,
    pub sound_main: String,
    pub sound_init: String,
    pub vsync: String,
    pub song_table: String,
    pub free_space: String,
    pub selector_address: String,
}

/// Outcome of ripping one ROM
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RipSummary {
    pub rom: PathBuf,
    pub output_dir: PathBuf,
    pub gsflib: PathBuf,
    pub offsets: LocatedOffsets,
    pub song_count: usize,
    pub duplicates: Vec<usize>,
    pub selector_width: usize,
    pub variants_written: usize,
    pub variant_failures: usize,
    pub override_used: bool,
}

impl RipSummary {
    pub fn from_session(session: &Session, selector_width: usize) -> Self {
        let hex = |value: usize| format!("0x{:X}", value);
        let entry = &session.entry_points;

        Self {
            rom: session.rom_path.clone(),
            output_dir: session.output.dir.clone(),
            gsflib: session.output.gsflib.clone(),
            offsets: LocatedOffsets {
                select_song: hex(entry.select_song),
                sound_main: hex(entry.sound_main),
                sound_init: hex(entry.sound_init),
                vsync: hex(entry.vsync),
                song_table: hex(session.song_table.offset()),
                free_space: session
                    .free_space
                    .map(|space| hex(space.offset))
                    .unwrap_or_default(),
                selector_address: session
                    .placement
                    .map(|p| format!("0x{:08X}", p.selector_address))
                    .unwrap_or_default(),
            },
            song_count: session.song_table.song_count(),
            duplicates: session.duplicates().iter().copied().collect(),
            selector_width,
            variants_written: session.variants.written,
            variant_failures: session.variants.failed,
            override_used: session.override_used,
        }
    }
}

/// Save summaries to a JSON file
pub fn save_report(path: &Path, summaries: &[RipSummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(summaries)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchPlacement;
    use crate::rom::mock::{MockRomBuilder, song_record};
    use crate::ripper::OutputPaths;
    use crate::scan::FreeSpace;
    use crate::song_table::SongTable;

    fn finished_session() -> Session {
        let rom = MockRomBuilder::new(0x100)
            .song_table(0x40, &[song_record(1), song_record(1)])
            .build();
        let rom_path = Path::new("roms/game.gba");
        let output = OutputPaths::for_rom(rom_path, None).unwrap();
        let mut session = Session::new(rom_path, rom, output);

        session.entry_points.select_song = 0x1000;
        session.entry_points.vsync = 0xDFB;
        session.song_table = SongTable::analyze(&session.rom, 0x40);
        session.free_space = Some(FreeSpace {
            offset: 0x2000,
            filler: 0xFF,
        });
        session.placement = Some(PatchPlacement {
            block_offset: 0x2108,
            selector_address: 0x0800_21FC,
        });
        session.variants.written = 1;
        session
    }

    #[test]
    fn test_summary_from_session() {
        let summary = RipSummary::from_session(&finished_session(), 1);
        assert_eq!(summary.offsets.select_song, "0x1000");
        assert_eq!(summary.offsets.vsync, "0xDFB");
        assert_eq!(summary.offsets.song_table, "0x40");
        assert_eq!(summary.offsets.selector_address, "0x080021FC");
        assert_eq!(summary.song_count, 2);
        assert_eq!(summary.duplicates, vec![1]);
        assert_eq!(summary.gsflib, Path::new("roms/game/game.gsflib"));
    }

    #[test]
    fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let summary = RipSummary::from_session(&finished_session(), 1);

        save_report(&path, &[summary]).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json[0]["song_count"], 2);
        assert_eq!(json[0]["offsets"]["free_space"], "0x2000");
        assert_eq!(json[0]["override_used"], false);
    }
}
