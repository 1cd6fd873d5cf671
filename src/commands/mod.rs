use crate::commands::cue::CueToTocCommand;
use crate::commands::wav::WavToTocCommand;
use clap::{Parser, Subcommand};

pub mod cue;
pub mod wav;

/// CLI for turning CUE sheets and WAV files into cdrdao TOC files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print debug output
    #[arg(long, short = 'd', global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Cue(CueToTocCommand),
    Wav(WavToTocCommand),
}
