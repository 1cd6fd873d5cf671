// src/cue/models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueLine {
    /// 1-based line number in the CUE text
    pub number: usize,
    /// Trimmed raw text of the line
    pub text: String,
    pub command: CueCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueCommand {
    Rem(RemCommand),
    Performer(String),
    Title(String),
    Songwriter(String),
    Catalog(String),
    File {
        name: String,
        file_type: FileType,
    },
    Track {
        number: u8,
        track_type: TrackType,
    },
    /// Index position, already converted to frames
    Index {
        number: u8,
        position: u32,
    },
    /// Pregap length in frames
    Pregap(u32),
    /// Postgap length in frames
    Postgap(u32),
    Isrc(String),
    Flags(TrackFlags),
    /// Directive this parser does not understand, carrying the raw line
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemCommand {
    Genre(String),
    Date(String),
    DiscId(String),
    Comment(String),
    Session(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackType {
    Audio,
    CdG,
    Mode1_2048,
    Mode1_2352,
    Mode2_2336,
    Mode2_2352,
    CdI2336,
    CdI2352,
}

impl TrackType {
    pub fn is_audio(self) -> bool {
        self == TrackType::Audio
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Binary,
    Motorola,
    Aiff,
    Wave,
    Mp3,
    Flac,
}

impl FileType {
    /// Files holding raw sectors instead of audio samples.
    pub fn is_data(self) -> bool {
        matches!(self, FileType::Binary | FileType::Motorola)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackFlags {
    /// Digital copy permitted
    pub dcp: bool,
    pub four_channel: bool,
    pub pre_emphasis: bool,
    /// Serial copy management system, not representable in a TOC file
    pub scms: bool,
}
