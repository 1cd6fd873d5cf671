use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("Invalid MSF format: {0}")]
    InvalidMSFFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),

    #[error("Unknown file type: {0}")]
    InvalidFileType(String),

    #[error("Unknown track type: {0}")]
    InvalidTrackType(String),

    #[error("Unknown track flag: {0}")]
    InvalidFlag(String),

    #[error("Invalid catalog number: {0}")]
    InvalidCatalog(String),

    #[error("Invalid ISRC code: {0}")]
    InvalidIsrc(String),

    #[error("Missing closing quote")]
    MissingQuote,

    #[error("TRACK {0} is not preceded by a FILE command")]
    TrackWithoutFile(u8),

    #[error("{0} is not preceded by a TRACK command")]
    OutsideTrack(&'static str),

    #[error("Track number {number} must be between 1 and 99")]
    TrackNumberOutOfRange { number: u8 },

    #[error("Track number {number} does not follow track {previous}")]
    NonMonotonicTrack { previous: u8, number: u8 },

    #[error("Index {number} does not follow index {previous}")]
    NonMonotonicIndex { previous: u8, number: u8 },

    #[error("Index {number} starts at or before the previous index of the track")]
    NonMonotonicIndexPosition { number: u8 },

    #[error("Index {0} lies at or past the end of its track")]
    IndexPastTrackEnd(u8),

    #[error("Index {0} is not stored in the same file as index 01")]
    IndexInForeignFile(u8),

    #[error("Track {0} has no INDEX 01")]
    MissingIndex01(u8),

    #[error("PREGAP conflicts with an explicit INDEX 00 or another PREGAP in track {0}")]
    DuplicatePregap(u8),

    #[error("Track {number} has a non-positive length of {length} frames")]
    NonPositiveLength { number: u8, length: i64 },

    #[error("Track {0} ends past the last addressable frame")]
    PastDiscEnd(u8),

    #[error("Session {number} does not follow session {current}")]
    InvalidSession { current: u8, number: u8 },

    #[error("Session {0} does not contain any audio track")]
    EmptySession(u8),

    #[error("Audio track {0} is stored in a data file")]
    AudioInDataFile(u8),

    #[error("No audio tracks found in CUE data")]
    NoTracks,
}

/// Structurally invalid CUE content, located by its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed CUE data at line {line}: {kind} ('{text}')")]
pub struct MalformedCueError {
    pub line: usize,
    pub text: String,
    pub kind: MalformedKind,
}

impl MalformedCueError {
    pub fn new(line: usize, text: impl Into<String>, kind: MalformedKind) -> Self {
        Self {
            line,
            text: text.into(),
            kind,
        }
    }
}

pub type CueResult<T> = Result<T, MalformedCueError>;
