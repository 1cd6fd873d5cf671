// src/disc/models
use crate::cd::{CD_BITS_PER_SAMPLE, CD_CHANNELS, CD_SAMPLE_RATE};
use crate::cue::models::TrackFlags;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Disc {
    pub catalog: Option<String>,
    pub performer: Option<String>,
    pub title: Option<String>,
    pub songwriter: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub disc_id: Option<String>,
    pub sessions: Vec<Session>,
    /// Data tracks were found in the CUE data and left out of the model
    pub has_data_tracks: bool,
    /// Session base offsets include the multi-session lead-in/lead-out overhead
    pub corrected: bool,
}

impl Disc {
    pub fn is_multisession(&self) -> bool {
        self.sessions.len() > 1 || self.has_data_tracks
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.sessions.iter().flat_map(|session| session.tracks.iter())
    }

    pub fn track_count(&self) -> usize {
        self.sessions.iter().map(|session| session.tracks.len()).sum()
    }

    /// Absolute frame address of a track's INDEX 01.
    pub fn absolute_start(&self, number: u8) -> Option<u32> {
        self.sessions.iter().find_map(|session| {
            session
                .tracks
                .iter()
                .find(|track| track.number == number)
                .map(|track| session.base_offset + track.start)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// 1-based session number
    pub number: u8,
    pub tracks: Vec<Track>,
    /// Absolute frame address where the session's program area starts
    pub base_offset: u32,
    pub lead_in: u32,
    pub lead_out: u32,
}

impl Session {
    pub fn new(number: u8, tracks: Vec<Track>) -> Self {
        Self {
            number,
            tracks,
            base_offset: 0,
            lead_in: 0,
            lead_out: 0,
        }
    }

    /// Frames covered by the session's tracks, pregaps and postgaps included.
    /// Saturates at `u32::MAX`.
    pub fn length(&self) -> u32 {
        self.tracks
            .iter()
            .fold(0u32, |total, track| total.saturating_add(track.span()))
    }

    /// Absolute frame address right after the session's last track.
    pub fn end(&self) -> u32 {
        self.base_offset.saturating_add(self.length())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub number: u8,
    pub mode: TrackMode,
    /// File holding INDEX 01 and the rest of the track
    pub audio: AudioRef,
    pub indices: Vec<Index>,
    pub pregap: Pregap,
    /// Silence appended after the track, in frames
    pub postgap: u32,
    /// Frame of INDEX 01 relative to the start of the session
    pub start: u32,
    /// Frames from INDEX 01 to the end of the track
    pub length: u32,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub songwriter: Option<String>,
    pub isrc: Option<String>,
    pub flags: TrackFlags,
}

impl Track {
    pub fn index(&self, number: u8) -> Option<&Index> {
        self.indices.iter().find(|index| index.number == number)
    }

    /// Position of INDEX 01 inside [`Track::audio`].
    pub fn index01_position(&self) -> u32 {
        self.index(1).map(|index| index.position).unwrap_or(0)
    }

    /// Position of INDEX 00 relative to the INDEX 01 file. A `PREGAP`
    /// declaration yields a virtual INDEX 00 that may lie before the start of
    /// the file, hence the signed result.
    pub fn pregap_start(&self) -> i64 {
        i64::from(self.index01_position()) - i64::from(self.pregap.length())
    }

    /// Frames occupied on disc: pregap, track and postgap.
    pub fn span(&self) -> u32 {
        self.pregap
            .length()
            .saturating_add(self.length)
            .saturating_add(self.postgap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackMode {
    #[default]
    Audio,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Pregap {
    #[default]
    None,
    /// INDEX 00 is stored in the same file as INDEX 01
    Inline { length: u32 },
    /// INDEX 00 is stored at the end of another file, usually the previous track's
    Split {
        audio: AudioRef,
        start: u32,
        length: u32,
    },
    /// PREGAP directive, silence generated by the writer
    Silence { length: u32 },
}

impl Pregap {
    pub fn length(&self) -> u32 {
        match self {
            Pregap::None => 0,
            Pregap::Inline { length }
            | Pregap::Split { length, .. }
            | Pregap::Silence { length } => *length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub number: u8,
    /// Frames from the start of the file the index is stored in
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef {
    /// File name as written in the CUE data
    pub name: String,
    /// Resolved location on disk
    pub path: PathBuf,
    pub probe: AudioProbe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioProbe {
    pub total_frames: u32,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl AudioProbe {
    pub fn is_cd_audio(&self) -> bool {
        self.sample_rate == CD_SAMPLE_RATE
            && self.channels == CD_CHANNELS
            && self.bits_per_sample == CD_BITS_PER_SAMPLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(number: u8, length: u32) -> Track {
        Track {
            number,
            mode: TrackMode::Audio,
            audio: AudioRef {
                name: "a.wav".to_string(),
                path: PathBuf::from("a.wav"),
                probe: AudioProbe {
                    total_frames: length,
                    sample_rate: 8_000,
                    channels: 1,
                    bits_per_sample: 8,
                },
            },
            indices: vec![Index {
                number: 1,
                position: 0,
            }],
            pregap: Pregap::Silence { length: 150 },
            postgap: 0,
            start: 150,
            length,
            title: None,
            performer: None,
            songwriter: None,
            isrc: None,
            flags: TrackFlags::default(),
        }
    }

    #[test]
    fn session_length_saturates() {
        let mut session = Session::new(1, vec![track(1, u32::MAX - 10), track(2, u32::MAX - 10)]);
        assert_eq!(session.length(), u32::MAX);

        session.base_offset = 29_400;
        assert_eq!(session.end(), u32::MAX);
    }

    #[test]
    fn session_length_sums_spans() {
        let session = Session::new(1, vec![track(1, 750), track(2, 1_500)]);
        assert_eq!(session.length(), 150 + 750 + 150 + 1_500);
        assert_eq!(session.tracks[1].pregap_start(), -150);
    }
}
