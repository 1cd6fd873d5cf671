use crate::cue::CueSheet;
use crate::cue::error::{CueResult, MalformedCueError, MalformedKind};
use crate::cue::models::{CueCommand, CueLine, RemCommand, TrackFlags};
use crate::disc::error::{DiscError, DiscResult, WavSearchError};
use crate::disc::models::{AudioRef, Disc, Index, Pregap, Session, Track, TrackMode};
use crate::wav::AudioInspector;
use log::{debug, warn};

pub mod error;
pub mod models;
pub mod session;

/// Highest track number a CD can address.
const MAX_TRACKS: usize = 99;

/// Builds a [`Disc`] from CUE commands, probing every referenced audio file
/// through an [`AudioInspector`].
pub struct DiscBuilder<'a, I: AudioInspector> {
    inspector: &'a I,
}

/// Where the builder is in the DISC → SESSION → TRACK hierarchy.
enum State {
    /// Before the first FILE
    Disc,
    /// A FILE is open, no TRACK yet
    Session,
    Track(PendingTrack),
}

struct FileSlot {
    audio: Option<AudioRef>,
}

struct PendingIndex {
    number: u8,
    position: u32,
    /// Slot of the FILE the index is stored in
    file: usize,
    line: usize,
    text: String,
}

#[derive(Default)]
struct PendingTrack {
    number: u8,
    line: usize,
    text: String,
    session: u8,
    is_data: bool,
    indices: Vec<PendingIndex>,
    pregap: Option<u32>,
    postgap: u32,
    title: Option<String>,
    performer: Option<String>,
    songwriter: Option<String>,
    isrc: Option<String>,
    flags: TrackFlags,
}

impl PendingTrack {
    fn malformed(&self, kind: MalformedKind) -> MalformedCueError {
        MalformedCueError::new(self.line, self.text.clone(), kind)
    }

    fn index(&self, number: u8) -> Option<&PendingIndex> {
        self.indices.iter().find(|index| index.number == number)
    }
}

/// Everything collected during one pass over the CUE commands.
struct Assembly {
    disc: Disc,
    files: Vec<FileSlot>,
    tracks: Vec<PendingTrack>,
    session: u8,
    session_track_count: usize,
    explicit_sessions: bool,
    last_track_number: Option<u8>,
}

impl Default for Assembly {
    fn default() -> Self {
        Self {
            disc: Disc::default(),
            files: Vec::new(),
            tracks: Vec::new(),
            session: 1,
            session_track_count: 0,
            explicit_sessions: false,
            last_track_number: None,
        }
    }
}

impl<'a, I: AudioInspector> DiscBuilder<'a, I> {
    pub fn new(inspector: &'a I) -> Self {
        Self { inspector }
    }

    pub async fn build(&self, sheet: &CueSheet) -> DiscResult<Disc> {
        if sheet.is_blank() {
            return Err(DiscError::EmptyCueData);
        }

        let mut assembly = Assembly::default();
        let mut state = State::Disc;

        for line in sheet.commands() {
            state = self.apply(&mut assembly, state, line?).await?;
        }

        if let State::Track(track) = state {
            assembly.finish_track(track)?;
        }

        Ok(assembly.into_disc(sheet.line_count())?)
    }

    /// Degenerate disc with one track per file, bypassing the CUE parser.
    pub async fn build_from_files(&self, names: &[String]) -> DiscResult<Disc> {
        if names.len() > MAX_TRACKS {
            return Err(DiscError::TooManyTracks(names.len()));
        }

        let mut assembly = Assembly::default();

        for (idx, name) in names.iter().enumerate() {
            let audio = self.inspect(name, None).await?;
            assembly.files.push(FileSlot { audio: Some(audio) });

            let number = (idx + 1) as u8;

            assembly.tracks.push(PendingTrack {
                number,
                line: 0,
                text: name.clone(),
                session: 1,
                indices: vec![PendingIndex {
                    number: 1,
                    position: 0,
                    file: idx,
                    line: 0,
                    text: name.clone(),
                }],
                ..PendingTrack::default()
            });
        }

        Ok(assembly.into_disc(0)?)
    }

    async fn inspect(&self, name: &str, line: Option<&CueLine>) -> Result<AudioRef, WavSearchError> {
        self.inspector
            .inspect(name)
            .await
            .map_err(|source| WavSearchError {
                name: name.to_string(),
                line: line.map(|line| (line.number, line.text.clone())),
                source,
            })
    }

    async fn apply(&self, assembly: &mut Assembly, state: State, line: CueLine) -> DiscResult<State> {
        let malformed = |kind| MalformedCueError::new(line.number, line.text.clone(), kind);

        let state = match (&line.command, state) {
            (CueCommand::Rem(RemCommand::Session(number)), state) => {
                if let State::Track(track) = state {
                    assembly.finish_track(track)?;
                }
                assembly.change_session(*number).map_err(malformed)?;
                if assembly.files.is_empty() {
                    State::Disc
                } else {
                    State::Session
                }
            }
            (CueCommand::Rem(rem), state) => {
                match rem {
                    RemCommand::Genre(genre) => assembly.disc.genre = Some(genre.clone()),
                    RemCommand::Date(date) => assembly.disc.date = Some(date.clone()),
                    RemCommand::DiscId(disc_id) => assembly.disc.disc_id = Some(disc_id.clone()),
                    RemCommand::Comment(_) | RemCommand::Session(_) => {}
                }
                state
            }
            (CueCommand::Catalog(catalog), state) => {
                assembly.disc.catalog = Some(catalog.clone());
                state
            }
            (CueCommand::Performer(value), State::Track(mut track)) => {
                track.performer = Some(value.clone());
                State::Track(track)
            }
            (CueCommand::Title(value), State::Track(mut track)) => {
                track.title = Some(value.clone());
                State::Track(track)
            }
            (CueCommand::Songwriter(value), State::Track(mut track)) => {
                track.songwriter = Some(value.clone());
                State::Track(track)
            }
            (CueCommand::Performer(value), state) => {
                assembly.disc.performer = Some(value.clone());
                state
            }
            (CueCommand::Title(value), state) => {
                assembly.disc.title = Some(value.clone());
                state
            }
            (CueCommand::Songwriter(value), state) => {
                assembly.disc.songwriter = Some(value.clone());
                state
            }
            (CueCommand::File { name, file_type }, state) => {
                let audio = if file_type.is_data() {
                    debug!("Not probing data file '{name}'");
                    None
                } else {
                    Some(self.inspect(name, Some(&line)).await?)
                };
                assembly.files.push(FileSlot { audio });

                match state {
                    State::Track(track) => State::Track(track),
                    State::Disc | State::Session => State::Session,
                }
            }
            (CueCommand::Track { number, track_type }, state) => {
                if assembly.files.is_empty() {
                    return Err(malformed(MalformedKind::TrackWithoutFile(*number)).into());
                }
                if let Some(previous) = assembly.last_track_number
                    && *number <= previous
                {
                    return Err(malformed(MalformedKind::NonMonotonicTrack {
                        previous,
                        number: *number,
                    })
                    .into());
                }
                if let State::Track(track) = state {
                    assembly.finish_track(track)?;
                }

                let is_data = !track_type.is_audio();
                if is_data {
                    warn!(
                        "Skipping data track {number} ({track_type:?}), only audio tracks are written to the TOC"
                    );
                    if !assembly.explicit_sessions {
                        warn!(
                            "Data track {number} without REM SESSION markers, assuming an enhanced (multi-session) disc"
                        );
                    }
                }

                assembly.last_track_number = Some(*number);
                assembly.session_track_count += 1;

                State::Track(PendingTrack {
                    number: *number,
                    line: line.number,
                    text: line.text.clone(),
                    session: assembly.session,
                    is_data,
                    ..PendingTrack::default()
                })
            }
            (CueCommand::Index { number, position }, State::Track(mut track)) => {
                if let Some(last) = track.indices.last()
                    && *number <= last.number
                {
                    return Err(malformed(MalformedKind::NonMonotonicIndex {
                        previous: last.number,
                        number: *number,
                    })
                    .into());
                }
                if *number == 0 && track.pregap.is_some() {
                    return Err(malformed(MalformedKind::DuplicatePregap(track.number)).into());
                }

                track.indices.push(PendingIndex {
                    number: *number,
                    position: *position,
                    file: assembly.files.len() - 1,
                    line: line.number,
                    text: line.text.clone(),
                });
                State::Track(track)
            }
            (CueCommand::Pregap(frames), State::Track(mut track)) => {
                if track.pregap.is_some() || track.index(0).is_some() {
                    return Err(malformed(MalformedKind::DuplicatePregap(track.number)).into());
                }
                track.pregap = Some(*frames);
                State::Track(track)
            }
            (CueCommand::Postgap(frames), State::Track(mut track)) => {
                track.postgap = *frames;
                State::Track(track)
            }
            (CueCommand::Isrc(isrc), State::Track(mut track)) => {
                track.isrc = Some(isrc.clone());
                State::Track(track)
            }
            (CueCommand::Flags(flags), State::Track(mut track)) => {
                track.flags = *flags;
                State::Track(track)
            }
            (CueCommand::Index { .. }, _) => {
                return Err(malformed(MalformedKind::OutsideTrack("INDEX")).into());
            }
            (CueCommand::Pregap(_), _) => {
                return Err(malformed(MalformedKind::OutsideTrack("PREGAP")).into());
            }
            (CueCommand::Postgap(_), _) => {
                return Err(malformed(MalformedKind::OutsideTrack("POSTGAP")).into());
            }
            (CueCommand::Isrc(_), _) => {
                return Err(malformed(MalformedKind::OutsideTrack("ISRC")).into());
            }
            (CueCommand::Flags(_), _) => {
                return Err(malformed(MalformedKind::OutsideTrack("FLAGS")).into());
            }
            (CueCommand::Unknown(raw), state) => {
                debug!("Ignoring unknown CUE line {}: {raw}", line.number);
                state
            }
        };

        Ok(state)
    }
}

impl Assembly {
    fn change_session(&mut self, number: u8) -> Result<(), MalformedKind> {
        self.explicit_sessions = true;
        if number == self.session {
            return Ok(());
        }
        if number != self.session.saturating_add(1) {
            return Err(MalformedKind::InvalidSession {
                current: self.session,
                number,
            });
        }
        if self.session_track_count == 0 {
            return Err(MalformedKind::EmptySession(self.session));
        }

        debug!("Starting session {number}");
        self.session = number;
        self.session_track_count = 0;
        Ok(())
    }

    fn finish_track(&mut self, track: PendingTrack) -> CueResult<()> {
        if track.index(1).is_none() {
            return Err(track.malformed(MalformedKind::MissingIndex01(track.number)));
        }

        if track.is_data {
            self.disc.has_data_tracks = true;
        } else {
            self.tracks.push(track);
        }

        Ok(())
    }

    fn into_disc(self, line_count: usize) -> CueResult<Disc> {
        let Assembly {
            mut disc,
            files,
            tracks,
            session: last_session,
            ..
        } = self;

        if tracks.is_empty() {
            return Err(MalformedCueError::new(
                line_count,
                String::new(),
                MalformedKind::NoTracks,
            ));
        }

        let mut groups: Vec<Vec<PendingTrack>> = Vec::new();
        let mut current_session = None;
        for track in tracks {
            if current_session != Some(track.session) {
                current_session = Some(track.session);
                groups.push(Vec::new());
            }
            if let Some(group) = groups.last_mut() {
                group.push(track);
            }
        }

        if groups.len() < usize::from(last_session) {
            warn!(
                "Dropping {} session(s) without audio tracks",
                usize::from(last_session) - groups.len()
            );
        }

        let mut base_offset = 0;
        for (idx, group) in groups.into_iter().enumerate() {
            let mut session = layout_session(idx as u8 + 1, group, &files)?;
            session.base_offset = base_offset;
            base_offset = session.end();
            disc.sessions.push(session);
        }

        debug!(
            "Built disc with {} tracks in {} session(s)",
            disc.track_count(),
            disc.sessions.len()
        );

        Ok(disc)
    }
}

fn audio_of(files: &[FileSlot], track: &PendingTrack, file: usize) -> CueResult<AudioRef> {
    files
        .get(file)
        .and_then(|slot| slot.audio.clone())
        .ok_or_else(|| track.malformed(MalformedKind::AudioInDataFile(track.number)))
}

/// Resolves lengths, pregaps and session-relative starts of one session.
fn layout_session(number: u8, pending: Vec<PendingTrack>, files: &[FileSlot]) -> CueResult<Session> {
    let mut tracks = Vec::with_capacity(pending.len());
    let mut cursor: u32 = 0;

    for (idx, track) in pending.iter().enumerate() {
        let index01 = track
            .index(1)
            .ok_or_else(|| track.malformed(MalformedKind::MissingIndex01(track.number)))?;
        let audio = audio_of(files, track, index01.file)?;

        // the track runs until the next track starts in the same file
        let end = match pending.get(idx + 1).and_then(|next| next.indices.first()) {
            Some(next) if next.file == index01.file => next.position,
            _ => audio.probe.total_frames,
        };
        let length = i64::from(end) - i64::from(index01.position);
        if length <= 0 {
            return Err(track.malformed(MalformedKind::NonPositiveLength {
                number: track.number,
                length,
            }));
        }

        let pregap = match (track.index(0), track.pregap) {
            (Some(index00), _) if index00.file == index01.file => {
                if index00.position >= index01.position {
                    return Err(MalformedCueError::new(
                        index01.line,
                        index01.text.clone(),
                        MalformedKind::NonMonotonicIndexPosition { number: 1 },
                    ));
                }
                Pregap::Inline {
                    length: index01.position - index00.position,
                }
            }
            (Some(index00), _) => {
                let pregap_audio = audio_of(files, track, index00.file)?;
                let pregap_length =
                    i64::from(pregap_audio.probe.total_frames) - i64::from(index00.position);
                if pregap_length <= 0 {
                    return Err(MalformedCueError::new(
                        index00.line,
                        index00.text.clone(),
                        MalformedKind::IndexPastTrackEnd(0),
                    ));
                }
                Pregap::Split {
                    audio: pregap_audio,
                    start: index00.position,
                    length: pregap_length as u32,
                }
            }
            (None, Some(frames)) if frames > 0 => Pregap::Silence { length: frames },
            (None, _) => Pregap::None,
        };

        let mut previous_position = index01.position;
        for index in track.indices.iter().filter(|index| index.number > 1) {
            let malformed = |kind| MalformedCueError::new(index.line, index.text.clone(), kind);
            if index.file != index01.file {
                return Err(malformed(MalformedKind::IndexInForeignFile(index.number)));
            }
            if index.position <= previous_position {
                return Err(malformed(MalformedKind::NonMonotonicIndexPosition {
                    number: index.number,
                }));
            }
            if index.position >= end {
                return Err(malformed(MalformedKind::IndexPastTrackEnd(index.number)));
            }
            previous_position = index.position;
        }

        let length = length as u32;
        let past_end = || track.malformed(MalformedKind::PastDiscEnd(track.number));
        let start = cursor.checked_add(pregap.length()).ok_or_else(past_end)?;
        cursor = start
            .checked_add(length)
            .and_then(|end| end.checked_add(track.postgap))
            .ok_or_else(past_end)?;

        tracks.push(Track {
            number: track.number,
            mode: TrackMode::Audio,
            audio,
            indices: track
                .indices
                .iter()
                .map(|index| Index {
                    number: index.number,
                    position: index.position,
                })
                .collect(),
            pregap,
            postgap: track.postgap,
            start,
            length,
            title: track.title.clone(),
            performer: track.performer.clone(),
            songwriter: track.songwriter.clone(),
            isrc: track.isrc.clone(),
            flags: track.flags,
        });
    }

    Ok(Session::new(number, tracks))
}
