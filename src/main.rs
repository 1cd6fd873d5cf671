use crate::commands::{Cli, Commands};
use crate::convert::{convert_cue, convert_wav_files};
use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

mod cd;
mod commands;
mod convert;
mod cue;
mod disc;
mod error;
mod source;
mod toc;
mod wav;

pub mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .try_init()?;

    match cli.command {
        Commands::Cue(cmd) => convert_cue(&cmd.source(), &cmd.sink(), &cmd.options()).await?,
        Commands::Wav(cmd) => {
            convert_wav_files(&cmd.wav_files, &cmd.sink(), &cmd.options()).await?
        }
    }

    Ok(())
}
