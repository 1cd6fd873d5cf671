use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),

    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    #[error(transparent)]
    RegexError(#[from] regex::Error),

    #[error("Could not find a WAV file matching '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("Found {} WAV files matching '{name}': {}", .matches.len(), format_paths(.matches))]
    TooManyMatches { name: String, matches: Vec<PathBuf> },

    #[error("Not a linear PCM WAV file, format tag {0:#06x}")]
    UnsupportedFormat(u16),

    #[error("Missing '{0}' chunk in WAV file")]
    MissingChunk(&'static str),

    #[error("Invalid WAV format chunk: {0}")]
    InvalidFormatChunk(String),

    #[error("WAV file is too long for a CD: {0} frames")]
    TooLong(u64),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("'{}'", path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type WavResult<T> = Result<T, WavError>;
