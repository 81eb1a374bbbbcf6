//! Rip orchestration.
//!
//! A [`Ripper`] turns one ROM into a `.gsflib` holding the patched image plus
//! one `.minigsf` per distinct song. Each call to [`Ripper::rip`] owns a fresh
//! [`Session`], so one ripper may serve several threads when its override
//! provider allows it.
//!
//! ## Example
//!
//! ```ignore
//! use saptapper_core::{RipConfig, Ripper};
//!
//! let ripper = Ripper::new(RipConfig::default())?;
//! let summary = ripper.rip("roms/game.gba")?;
//! println!("{} songs", summary.song_count);
//! ```

mod phase;
mod prompter;
mod report;
mod session;

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::RipConfig;
use crate::container::{ContainerWriter, Tags, selector_width, track_selector_exe};
use crate::error::{Error, Result};
use crate::patch::{PatchTemplate, inject};
use crate::rom::{RomImage, to_offset};
use crate::scan::constants::{
    SONG_TABLE_POINTER, SOUND_INIT_WINDOW, SOUND_MAIN_WINDOW, VSYNC_PROLOGUE, VSYNC_WINDOW,
};
use crate::scan::{
    Pattern, SELECT_SONG, SOUND_INIT, SOUND_MAIN, VSYNC, find_backward, find_forward,
    locate_patch_space,
};
use crate::song_table::SongTable;

pub use phase::Phase;
pub use prompter::{ManualOverrideProvider, NonInteractive};
pub use report::{LocatedOffsets, RipSummary, save_report};
pub use session::{OutputPaths, Session, VariantStats};

/// Compiled engine signatures.
#[derive(Debug, Clone)]
struct EnginePatterns {
    select_song: Pattern,
    sound_main: Pattern,
    sound_init: Pattern,
    vsync: Pattern,
}

pub struct Ripper<P: ManualOverrideProvider = NonInteractive> {
    config: RipConfig,
    provider: P,
    patterns: EnginePatterns,
    template: PatchTemplate,
    writer: ContainerWriter,
}

impl Ripper<NonInteractive> {
    /// Ripper that never asks for manual offsets.
    pub fn new(config: RipConfig) -> Result<Self> {
        Self::with_provider(config, NonInteractive)
    }
}

impl<P: ManualOverrideProvider> Ripper<P> {
    pub fn with_provider(config: RipConfig, provider: P) -> Result<Self> {
        let signatures = &config.signatures;
        let patterns = EnginePatterns {
            select_song: signatures.pattern(SELECT_SONG)?,
            sound_main: signatures.pattern(SOUND_MAIN)?,
            sound_init: signatures.pattern(SOUND_INIT)?,
            vsync: signatures.pattern(VSYNC)?,
        };

        Ok(Self {
            config,
            provider,
            patterns,
            template: PatchTemplate::driver(),
            writer: ContainerWriter::default(),
        })
    }

    pub fn config(&self) -> &RipConfig {
        &self.config
    }

    /// Rip one ROM file. On failure, an output directory created by this rip
    /// is removed again.
    pub fn rip<Q: AsRef<Path>>(&self, rom_path: Q) -> Result<RipSummary> {
        let rom_path = rom_path.as_ref();
        info!("Ripping {}", rom_path.display());

        let output = OutputPaths::for_rom(rom_path, self.config.output_root.as_deref())?;
        let rom = RomImage::load(rom_path)?;
        let mut session = Session::new(rom_path, rom, output);

        match self.run(&mut session) {
            Ok(()) => {
                let width = selector_width(session.song_table.song_count());
                Ok(RipSummary::from_session(&session, width))
            }
            Err(e) => {
                self.cleanup(&session);
                Err(e)
            }
        }
    }

    /// Drive `session` through every phase.
    pub fn run(&self, session: &mut Session) -> Result<()> {
        let mut phase = Phase::LocateSelectSong;
        while phase != Phase::Done {
            debug!("Phase: {}", phase);
            phase = self.step(phase, session)?;
        }
        Ok(())
    }

    fn step(&self, phase: Phase, session: &mut Session) -> Result<Phase> {
        match phase {
            Phase::LocateSelectSong => {
                let (offset, table) = match self.find_select_song(&session.rom) {
                    Some(found) => found,
                    None => {
                        let offset = self.manual_offset(phase, session, Error::NoSelectSong)?;
                        let table =
                            song_table_for(&session.rom, offset).ok_or(Error::NoSelectSong)?;
                        (offset, table)
                    }
                };
                debug!(
                    "  SelectSong: 0x{:X}, song table at 0x{:X} ({} entries)",
                    offset,
                    table.offset(),
                    table.song_count()
                );
                session.entry_points.select_song = offset;
                session.song_table = table;
            }
            Phase::LocateSoundMain => {
                let scan = find_backward(
                    &session.rom,
                    &self.patterns.sound_main,
                    session.entry_points.select_song,
                    SOUND_MAIN_WINDOW,
                );
                session.entry_points.sound_main =
                    self.resolve(phase, session, scan, Error::NoSoundMain)?;
                debug!("  SoundMain: 0x{:X}", session.entry_points.sound_main);
            }
            Phase::LocateSoundInit => {
                let scan = find_backward(
                    &session.rom,
                    &self.patterns.sound_init,
                    session.entry_points.sound_main,
                    SOUND_INIT_WINDOW,
                );
                session.entry_points.sound_init =
                    self.resolve(phase, session, scan, Error::NoSoundInit)?;
                debug!("  SoundInit: 0x{:X}", session.entry_points.sound_init);
            }
            Phase::LocateVsync => {
                let scan = find_backward(
                    &session.rom,
                    &self.patterns.vsync,
                    session.entry_points.sound_init,
                    VSYNC_WINDOW,
                )
                .and_then(|pos| pos.checked_sub(VSYNC_PROLOGUE));
                session.entry_points.vsync = self.resolve(phase, session, scan, Error::NoVSync)?;
                debug!("  VSync: 0x{:X}", session.entry_points.vsync);
            }
            Phase::LocateFreeSpace => {
                let space = locate_patch_space(&session.rom)?;
                debug!(
                    "  Free space: 0x{:X} (filler 0x{:02X})",
                    space.offset, space.filler
                );
                session.free_space = Some(space);
            }
            Phase::EmitMain => self.emit_main(session)?,
            Phase::EmitVariants => self.emit_variants(session)?,
            Phase::Done => {}
        }
        Ok(phase.next())
    }

    /// First select-song match whose song table holds at least one song.
    fn find_select_song(&self, rom: &RomImage) -> Option<(usize, SongTable)> {
        let mut start = 0;
        while let Some(pos) = find_forward(rom, &self.patterns.select_song, start) {
            if let Some(table) = song_table_for(rom, pos) {
                return Some((pos, table));
            }
            debug!("  Rejected select-song candidate at 0x{:X}: no song table", pos);
            start = pos + 1;
        }
        None
    }

    fn resolve(
        &self,
        phase: Phase,
        session: &mut Session,
        scan: Option<usize>,
        declined: Error,
    ) -> Result<usize> {
        match scan {
            Some(offset) => Ok(offset),
            None => self.manual_offset(phase, session, declined),
        }
    }

    /// Ask the provider for the offset a failed scan was looking for.
    fn manual_offset(&self, phase: Phase, session: &mut Session, declined: Error) -> Result<usize> {
        warn!(
            "{}: unable to locate {}",
            session.rom_path.display(),
            phase.routine().unwrap_or("routine")
        );

        match self.provider.request_offset(phase) {
            Some(offset) if offset != 0 && (offset as usize) < session.rom.len() => {
                info!("Using manual offset 0x{:X} for {}", offset, phase);
                session.override_used = true;
                Ok(offset as usize)
            }
            Some(offset) if offset != 0 => {
                warn!("Manual offset 0x{:X} lies outside the ROM", offset);
                Err(declined)
            }
            _ => Err(declined),
        }
    }

    fn emit_main(&self, session: &mut Session) -> Result<()> {
        let space = session.free_space.ok_or(Error::InsufficientSpace)?;
        let placement = inject(
            &mut session.rom,
            &self.template,
            &session.entry_points,
            space.offset,
        )?;
        session.placement = Some(placement);

        self.prepare_output_dir(session)?;
        let info = self
            .writer
            .write(&session.output.gsflib, &session.rom.to_exe(), &Tags::new())?;
        info!(
            "Wrote {} ({} bytes compressed)",
            session.output.gsflib.display(),
            info.compressed_len
        );
        Ok(())
    }

    fn prepare_output_dir(&self, session: &mut Session) -> Result<()> {
        let dir = &session.output.dir;
        if dir.is_dir() {
            return Ok(());
        }
        if dir.exists() {
            return Err(Error::FileWriteError {
                path: dir.clone(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
            });
        }
        fs::create_dir_all(dir).map_err(|source| Error::FileWriteError {
            path: dir.clone(),
            source,
        })?;
        session.created_dir = true;
        Ok(())
    }

    fn emit_variants(&self, session: &mut Session) -> Result<()> {
        // The patch is only placed once free space was found.
        let placement = session.placement.ok_or(Error::InsufficientSpace)?;
        let song_count = session.song_table.song_count();
        let width = selector_width(song_count);
        let tags = self.variant_tags(session);

        let indices: Vec<usize> = session.song_table.unique_indices().collect();
        session.variants.skipped = song_count - indices.len();

        for index in indices {
            let path = session.output.minigsf(index);
            let result = track_selector_exe(placement.selector_address, index, width)
                .and_then(|exe| self.writer.write(&path, &exe, &tags));
            match result {
                Ok(_) => session.variants.written += 1,
                Err(e) => {
                    warn!("{}: {}", path.display(), e);
                    session.variants.failed += 1;
                }
            }
        }

        let stats = session.variants;
        info!(
            "{} minigsf(s) written, {} duplicate(s) skipped",
            stats.written, stats.skipped
        );
        if stats.failed > 0 {
            warn!("{} error(s)", stats.failed);
            if stats.written == 0 {
                return Err(Error::VariantsFailed {
                    failed: stats.failed,
                });
            }
        }
        Ok(())
    }

    fn variant_tags(&self, session: &Session) -> Tags {
        let credit = &self.config.credit;
        let gsfby = if session.override_used {
            match self.provider.request_credit() {
                Some(name) if !name.trim().is_empty() => {
                    format!("{}, with help of {}", credit, name.trim())
                }
                _ => credit.clone(),
            }
        } else {
            credit.clone()
        };

        let mut tags = Tags::new();
        tags.set("_lib", session.output.gsflib_name());
        tags.set("gsfby", gsfby);
        tags
    }

    fn cleanup(&self, session: &Session) {
        if !session.created_dir {
            return;
        }
        match fs::remove_dir_all(&session.output.dir) {
            Ok(()) => debug!("Removed {}", session.output.dir.display()),
            Err(e) => warn!(
                "Failed to remove {}: {}",
                session.output.dir.display(),
                e
            ),
        }
    }
}

/// Song table referenced by the select-song routine at `select_offset`, if it
/// holds at least one song.
fn song_table_for(rom: &RomImage, select_offset: usize) -> Option<SongTable> {
    let pointer = rom.read_u32(select_offset.checked_add(SONG_TABLE_POINTER)?)?;
    let table_offset = to_offset(pointer).ok()? as usize;
    let table = SongTable::analyze(rom, table_offset);
    (!table.is_empty()).then_some(table)
}
