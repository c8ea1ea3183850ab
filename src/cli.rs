//! Command-line interface for auramgr

use clap::Parser;
use std::path::PathBuf;

/// Aura manager scenario runner
#[derive(Parser, Debug)]
#[command(name = "auramgr")]
#[command(about = "Runs aura manager scenarios headless")]
#[command(version)]
pub struct Args {
    /// Run the JSON scenario at this path
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the aura log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Stop after this many frames even if simulated time remains
    #[arg(long, value_name = "FRAMES")]
    pub max_frames: Option<u32>,

    /// Spell definitions to load instead of the scenario's or the default
    #[arg(long, value_name = "SPELLS_RON")]
    pub spells: Option<PathBuf>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
