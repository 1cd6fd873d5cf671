use crate::convert::ConvertOptions;
use crate::source::TocSink;
use clap::Parser;
use std::path::PathBuf;

/// Writes a TOC file with one audio track per WAV file.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct WavToTocCommand {
    /// WAV files in track order
    #[arg(value_name = "WAV_FILES", required = true)]
    pub wav_files: Vec<String>,

    /// Output TOC file, writes to stdout when omitted or '-'
    #[arg(long, short = 'o', value_name = "TOC_FILE")]
    pub output: Option<PathBuf>,

    /// Force overwrite of the output file if it already exists
    #[arg(long, short = 'f', value_name = "FORCE", default_value_t = false)]
    pub force: bool,
}

impl WavToTocCommand {
    pub fn sink(&self) -> TocSink {
        TocSink::from_arg(self.output.clone())
    }

    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            force: self.force,
            ..ConvertOptions::default()
        }
    }
}
