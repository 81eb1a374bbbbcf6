mod prompter;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use saptapper_core::{
    Error, ManualOverrideProvider, NonInteractive, RipConfig, RipSummary, Ripper,
    load_signatures, save_report,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::prompter::CliPrompter;

#[derive(Parser, Debug)]
#[command(name = "saptapper")]
#[command(about = "Rip GBA sound engine music into GSF sets")]
#[command(version)]
struct Args {
    /// ROM images to rip
    #[arg(required = true)]
    roms: Vec<PathBuf>,

    /// Directory under which each ROM's output directory is created
    #[arg(short, long, env = "SAPTAPPER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Prompt for offsets the signature scan cannot find
    #[arg(short, long)]
    manual: bool,

    /// Name written to the gsfby tag
    #[arg(long, env = "SAPTAPPER_CREDIT")]
    credit: Option<String>,

    /// JSON signature set replacing the built-in signatures
    #[arg(short, long)]
    signatures: Option<PathBuf>,

    /// Write a JSON summary of every successful rip
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("saptapper={}", level).parse()?),
        )
        .init();

    let config = build_config(&args)?;
    let (summaries, failed) = if args.manual {
        rip_all(&Ripper::with_provider(config, CliPrompter)?, &args)
    } else {
        rip_all(&Ripper::with_provider(config, NonInteractive)?, &args)
    };

    if let Some(path) = &args.report {
        save_report(path, &summaries)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    if failed > 0 {
        eprintln!(
            "{} of {} file(s) failed",
            failed.to_string().red(),
            args.roms.len()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn build_config(args: &Args) -> Result<RipConfig> {
    let mut builder = RipConfig::builder();
    if let Some(dir) = &args.output_dir {
        builder = builder.output_root(dir);
    }
    if let Some(credit) = &args.credit {
        builder = builder.credit(credit.as_str());
    }
    if let Some(path) = &args.signatures {
        let signatures = load_signatures(path)
            .with_context(|| format!("Failed to load signatures from {}", path.display()))?;
        debug!("Loaded signatures version: {}", signatures.version);
        builder = builder.signatures(signatures);
    }
    Ok(builder.build())
}

/// Rip every input in order; one failure never stops the rest.
fn rip_all<P: ManualOverrideProvider>(
    ripper: &Ripper<P>,
    args: &Args,
) -> (Vec<RipSummary>, usize) {
    let mut summaries = Vec::new();
    let mut failed = 0;

    for rom in &args.roms {
        match ripper.rip(rom) {
            Ok(summary) => {
                print_summary(&summary);
                summaries.push(summary);
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "Error".red().bold(), rom.display(), e);
                if let Some(hint) = failure_hint(&e, args.manual) {
                    eprintln!("  {}", hint);
                }
            }
        }
    }

    (summaries, failed)
}

fn failure_hint(error: &Error, manual: bool) -> Option<&'static str> {
    if error.is_not_found() {
        Some("check the ROM path")
    } else if error.is_scan_failure() && !manual {
        Some("rerun with --manual to enter the offset yourself")
    } else {
        None
    }
}

fn print_summary(summary: &RipSummary) {
    println!(
        "{} {} -> {}",
        "OK".green().bold(),
        summary.rom.display(),
        display_dir(&summary.output_dir)
    );
    println!(
        "  {} song(s), {} duplicate(s), {} minigsf(s) written",
        summary.song_count,
        summary.duplicates.len(),
        summary.variants_written
    );
    if summary.variant_failures > 0 {
        println!(
            "  {}",
            format!("{} error(s)", summary.variant_failures).yellow()
        );
    }
}

fn display_dir(path: &Path) -> String {
    let shown = path.display().to_string();
    if shown.is_empty() { ".".to_string() } else { shown }
}
