//! # saptapper-core
//!
//! Core library for the Saptapper GSF ripper.
//!
//! This crate provides:
//! - Fuzzy signature scanning for the sound engine's entry points
//! - Free-space location and sound driver injection
//! - Song table analysis
//! - Compressed container writing (`.gsflib` and per-track `.minigsf`)
//! - The rip state machine with optional manual offset overrides

pub mod config;
pub mod container;
pub mod error;
pub mod patch;
pub mod ripper;
pub mod rom;
pub mod scan;
pub mod song_table;

pub use config::{DEFAULT_CREDIT, RipConfig, RipConfigBuilder};
pub use container::{
    Container, ContainerInfo, ContainerWriter, Tags, parse_container, read_container,
    selector_width, track_selector_exe,
};
pub use error::{Error, Result};
pub use patch::{EntryPoints, PatchPlacement, PatchTemplate, inject};
pub use ripper::{
    LocatedOffsets, ManualOverrideProvider, NonInteractive, OutputPaths, Phase, RipSummary,
    Ripper, Session, VariantStats, save_report,
};
pub use rom::{Address, ROM_BASE, RomImage};
pub use scan::{
    FreeSpace, Pattern, Signature, SignatureSet, builtin_signatures, find_backward, find_forward,
    load_signatures, locate_patch_space, save_signatures,
};
pub use song_table::{SongDescriptor, SongTable};
