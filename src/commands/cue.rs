use crate::convert::{ConvertOptions, SessionPolicy};
use crate::source::{CueSource, TocSink};
use clap::Parser;
use std::path::PathBuf;

/// Converts a CUE sheet referencing WAV files into a cdrdao TOC file.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(
    long_about = "Converts a CUE sheet referencing WAV files into a cdrdao TOC file\n\nNote: CUE data describing more than one session or data tracks requires either --multi or --no-multi"
)]
pub struct CueToTocCommand {
    /// Input CUE file, reads stdin when omitted or '-'
    #[arg(value_name = "CUE_FILE")]
    pub cue_file: Option<PathBuf>,

    /// Output TOC file, writes to stdout when omitted or '-'
    #[arg(value_name = "TOC_FILE")]
    pub toc_file: Option<PathBuf>,

    #[arg(
        value_name = "MULTI",
        long = "multi",
        short = 'm',
        help = "writes a multi-session TOC, offsetting later sessions behind the lead-out of the previous one",
        default_value_t = false,
        conflicts_with = "no_multi"
    )]
    pub multi: bool,

    #[arg(
        value_name = "NO_MULTI",
        long = "no-multi",
        short = 'z',
        help = "writes every session into a single audio session",
        default_value_t = false
    )]
    pub no_multi: bool,

    /// Directory to search for WAV files, defaults to the CUE file's directory
    #[arg(long, short = 's', value_name = "SEARCH_DIR")]
    pub search_dir: Option<PathBuf>,

    /// Force overwrite of the output file if it already exists
    #[arg(long, short = 'f', value_name = "FORCE", default_value_t = false)]
    pub force: bool,
}

impl CueToTocCommand {
    pub fn source(&self) -> CueSource {
        CueSource::from_arg(self.cue_file.clone())
    }

    pub fn sink(&self) -> TocSink {
        TocSink::from_arg(self.toc_file.clone())
    }

    pub fn options(&self) -> ConvertOptions {
        let session_policy = match (self.multi, self.no_multi) {
            (true, _) => SessionPolicy::Multi,
            (_, true) => SessionPolicy::Single,
            _ => SessionPolicy::RequireConfirmation,
        };

        ConvertOptions {
            search_dir: self.search_dir.clone(),
            session_policy,
            force: self.force,
        }
    }
}
