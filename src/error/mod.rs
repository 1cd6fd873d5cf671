use crate::disc::error::DiscError;
use std::path::PathBuf;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CueTocError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    DiscError(#[from] DiscError),

    #[error(
        "The CUE data describes a multi-session disc. Confirm with --multi to write a multi-session TOC or use --no-multi to write a single session"
    )]
    MultiSessionNotConfirmed,

    #[error("The output file already exists, use --force to overwrite it: {0}")]
    OutputExists(PathBuf),

    #[error("At least one WAV file is required")]
    NoWavFiles,
}

pub type CueTocResult<T> = result::Result<T, CueTocError>;
