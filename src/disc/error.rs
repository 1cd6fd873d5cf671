use crate::cue::error::MalformedCueError;
use crate::wav::error::WavError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A referenced audio file could not be located or read.
#[derive(Debug, Error)]
pub struct WavSearchError {
    /// File name as written in the CUE data or on the command line
    pub name: String,
    /// CUE line number and text of the referencing `FILE` directive
    pub line: Option<(usize, String)>,
    #[source]
    pub source: WavError,
}

impl Display for WavSearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not use WAV file '{}'", self.name)?;
        if let Some((number, text)) = &self.line {
            write!(f, " referenced at CUE line {number} ('{text}')")?;
        }
        write!(f, ": {}", self.source)
    }
}

#[derive(Debug, Error)]
pub enum DiscError {
    #[error(transparent)]
    MalformedCue(#[from] MalformedCueError),

    #[error(transparent)]
    WavSearch(#[from] WavSearchError),

    #[error("No CUE data found")]
    EmptyCueData,

    #[error("A CD holds at most 99 tracks, got {0}")]
    TooManyTracks(usize),
}

pub type DiscResult<T> = Result<T, DiscError>;
