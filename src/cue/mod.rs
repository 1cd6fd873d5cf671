use crate::cd::Msf;
use crate::cue::error::{CueResult, MalformedCueError, MalformedKind};
use crate::cue::models::{CueCommand, CueLine, FileType, RemCommand, TrackFlags, TrackType};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::iter::Enumerate;
use std::str::Lines;

pub mod error;
pub mod models;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r#""([^"]*)"|(\S+)"#).unwrap();
}

/// Decoded CUE text. Every call to [`CueSheet::commands`] starts a new pass
/// over the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueSheet {
    text: String,
}

impl CueSheet {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Decodes UTF-8 (with or without BOM). Anything that is not valid UTF-8
    /// is read as Latin-1, one character per byte.
    pub fn from_bytes(data: &[u8]) -> Self {
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

        let text = match std::str::from_utf8(data) {
            Ok(text) => text.to_string(),
            Err(e) => {
                debug!("CUE data is not valid UTF-8 ({e}), decoding as Latin-1");
                data.iter().map(|&b| char::from(b)).collect()
            }
        };

        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of lines, used to locate errors found after the last command.
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    pub fn commands(&self) -> Commands<'_> {
        Commands {
            lines: self.text.lines().enumerate(),
        }
    }
}

/// Lazy command stream over the lines of a [`CueSheet`]. Blank lines are skipped.
pub struct Commands<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl Iterator for Commands<'_> {
    type Item = CueResult<CueLine>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            let number = idx + 1;
            return Some(parse_line(text).map_err(|kind| MalformedCueError::new(number, text, kind)).map(
                |command| CueLine {
                    number,
                    text: text.to_string(),
                    command,
                },
            ));
        }

        None
    }
}

fn tokenize(line: &str) -> Result<Vec<&str>, MalformedKind> {
    let mut tokens = Vec::new();

    for captures in TOKEN_RE.captures_iter(line) {
        if let Some(quoted) = captures.get(1) {
            tokens.push(quoted.as_str());
        } else if let Some(bare) = captures.get(2) {
            if bare.as_str().starts_with('"') {
                return Err(MalformedKind::MissingQuote);
            }
            tokens.push(bare.as_str());
        }
    }

    Ok(tokens)
}

fn parse_line(line: &str) -> Result<CueCommand, MalformedKind> {
    let tokens = tokenize(line)?;
    let Some(keyword) = tokens.first() else {
        return Ok(CueCommand::Unknown(line.to_string()));
    };
    let args = &tokens[1..];

    let command = match keyword.to_ascii_uppercase().as_str() {
        "REM" => parse_rem(line, args)?,
        "PERFORMER" => CueCommand::Performer(join_args(args, "PERFORMER")?),
        "TITLE" => CueCommand::Title(join_args(args, "TITLE")?),
        "SONGWRITER" => CueCommand::Songwriter(join_args(args, "SONGWRITER")?),
        "CATALOG" => {
            let catalog = first_arg(args, "CATALOG")?;
            if catalog.len() != 13 || !catalog.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MalformedKind::InvalidCatalog(catalog.to_string()));
            }
            CueCommand::Catalog(catalog.to_string())
        }
        "FILE" => {
            if args.len() < 2 {
                return Err(MalformedKind::MissingArgument("FILE"));
            }
            // unquoted names may contain spaces, the type is always the last token
            let name = args[..args.len() - 1].join(" ");
            let file_type = parse_file_type(args[args.len() - 1])?;
            CueCommand::File { name, file_type }
        }
        "TRACK" => {
            if args.len() < 2 {
                return Err(MalformedKind::MissingArgument("TRACK"));
            }
            let number = parse_number(args[0])?;
            if !(1..=99).contains(&number) {
                return Err(MalformedKind::TrackNumberOutOfRange { number });
            }
            let track_type = parse_track_type(args[1])?;
            CueCommand::Track { number, track_type }
        }
        "INDEX" => {
            if args.len() < 2 {
                return Err(MalformedKind::MissingArgument("INDEX"));
            }
            let number = parse_number(args[0])?;
            if number > 99 {
                return Err(MalformedKind::InvalidNumber(args[0].to_string()));
            }
            let position = parse_msf(args[1])?.to_frames();
            CueCommand::Index { number, position }
        }
        "PREGAP" => CueCommand::Pregap(parse_msf(first_arg(args, "PREGAP")?)?.to_frames()),
        "POSTGAP" => CueCommand::Postgap(parse_msf(first_arg(args, "POSTGAP")?)?.to_frames()),
        "ISRC" => {
            let isrc = first_arg(args, "ISRC")?;
            if isrc.len() != 12 || !isrc.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(MalformedKind::InvalidIsrc(isrc.to_string()));
            }
            CueCommand::Isrc(isrc.to_string())
        }
        "FLAGS" => CueCommand::Flags(parse_flags(args)?),
        _ => CueCommand::Unknown(line.to_string()),
    };

    Ok(command)
}

fn parse_rem(line: &str, args: &[&str]) -> Result<CueCommand, MalformedKind> {
    let Some(key) = args.first() else {
        return Ok(CueCommand::Unknown(line.to_string()));
    };
    let values = &args[1..];

    let rem = match key.to_ascii_uppercase().as_str() {
        "GENRE" => RemCommand::Genre(join_args(values, "REM GENRE")?),
        "DATE" => RemCommand::Date(join_args(values, "REM DATE")?),
        "DISCID" => RemCommand::DiscId(join_args(values, "REM DISCID")?),
        "COMMENT" => RemCommand::Comment(values.join(" ")),
        "SESSION" => RemCommand::Session(parse_number(first_arg(values, "REM SESSION")?)?),
        _ => return Ok(CueCommand::Unknown(line.to_string())),
    };

    Ok(CueCommand::Rem(rem))
}

fn first_arg<'a>(args: &[&'a str], command: &'static str) -> Result<&'a str, MalformedKind> {
    args.first()
        .copied()
        .ok_or(MalformedKind::MissingArgument(command))
}

fn join_args(args: &[&str], command: &'static str) -> Result<String, MalformedKind> {
    if args.is_empty() {
        return Err(MalformedKind::MissingArgument(command));
    }
    Ok(args.join(" "))
}

fn parse_number(value: &str) -> Result<u8, MalformedKind> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedKind::InvalidNumber(value.to_string()));
    }
    value
        .parse::<u8>()
        .map_err(|_| MalformedKind::InvalidNumber(value.to_string()))
}

fn parse_msf(value: &str) -> Result<Msf, MalformedKind> {
    value
        .parse::<Msf>()
        .map_err(|_| MalformedKind::InvalidMSFFormat(value.to_string()))
}

fn parse_file_type(type_str: &str) -> Result<FileType, MalformedKind> {
    match type_str.to_ascii_uppercase().as_str() {
        "BINARY" => Ok(FileType::Binary),
        "MOTOROLA" => Ok(FileType::Motorola),
        "AIFF" => Ok(FileType::Aiff),
        "WAVE" => Ok(FileType::Wave),
        "MP3" => Ok(FileType::Mp3),
        "FLAC" => Ok(FileType::Flac),
        _ => Err(MalformedKind::InvalidFileType(type_str.to_string())),
    }
}

fn parse_track_type(type_str: &str) -> Result<TrackType, MalformedKind> {
    match type_str.to_ascii_uppercase().as_str() {
        "AUDIO" => Ok(TrackType::Audio),
        "CDG" => Ok(TrackType::CdG),
        "MODE1/2048" => Ok(TrackType::Mode1_2048),
        "MODE1/2352" => Ok(TrackType::Mode1_2352),
        "MODE2/2336" => Ok(TrackType::Mode2_2336),
        "MODE2/2352" => Ok(TrackType::Mode2_2352),
        "CDI/2336" => Ok(TrackType::CdI2336),
        "CDI/2352" => Ok(TrackType::CdI2352),
        _ => Err(MalformedKind::InvalidTrackType(type_str.to_string())),
    }
}

fn parse_flags(args: &[&str]) -> Result<TrackFlags, MalformedKind> {
    if args.is_empty() {
        return Err(MalformedKind::MissingArgument("FLAGS"));
    }

    let mut flags = TrackFlags::default();
    for flag in args {
        match flag.to_ascii_uppercase().as_str() {
            "DCP" => flags.dcp = true,
            "4CH" => flags.four_channel = true,
            "PRE" => flags.pre_emphasis = true,
            "SCMS" => flags.scms = true,
            _ => return Err(MalformedKind::InvalidFlag(flag.to_string())),
        }
    }

    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(text: &str) -> Vec<CueCommand> {
        CueSheet::new(text)
            .commands()
            .map(|line| line.unwrap().command)
            .collect()
    }

    fn first_error(text: &str) -> MalformedCueError {
        CueSheet::new(text)
            .commands()
            .find_map(Result::err)
            .expect("expected a malformed line")
    }

    #[test]
    fn parses_eac_style_sheet() {
        let cue = r#"REM GENRE "Progressive Rock"
REM DATE 1994
REM DISCID 5F0C0E07
REM COMMENT "ExactAudioCopy v0.99pb4"
CATALOG 0724383960525
PERFORMER "Some Artist"
TITLE "Some Album"
FILE "01 - Intro.wav" WAVE
  TRACK 01 AUDIO
    TITLE "Intro"
    FLAGS DCP PRE
    ISRC USABC9400001
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    INDEX 00 04:10:20
FILE "02 - Song.wav" WAVE
    INDEX 01 00:00:00
"#;

        assert_eq!(
            commands(cue),
            vec![
                CueCommand::Rem(RemCommand::Genre("Progressive Rock".to_string())),
                CueCommand::Rem(RemCommand::Date("1994".to_string())),
                CueCommand::Rem(RemCommand::DiscId("5F0C0E07".to_string())),
                CueCommand::Rem(RemCommand::Comment("ExactAudioCopy v0.99pb4".to_string())),
                CueCommand::Catalog("0724383960525".to_string()),
                CueCommand::Performer("Some Artist".to_string()),
                CueCommand::Title("Some Album".to_string()),
                CueCommand::File {
                    name: "01 - Intro.wav".to_string(),
                    file_type: FileType::Wave
                },
                CueCommand::Track {
                    number: 1,
                    track_type: TrackType::Audio
                },
                CueCommand::Title("Intro".to_string()),
                CueCommand::Flags(TrackFlags {
                    dcp: true,
                    pre_emphasis: true,
                    ..TrackFlags::default()
                }),
                CueCommand::Isrc("USABC9400001".to_string()),
                CueCommand::Index {
                    number: 1,
                    position: 0
                },
                CueCommand::Track {
                    number: 2,
                    track_type: TrackType::Audio
                },
                CueCommand::Index {
                    number: 0,
                    position: 18_770
                },
                CueCommand::File {
                    name: "02 - Song.wav".to_string(),
                    file_type: FileType::Wave
                },
                CueCommand::Index {
                    number: 1,
                    position: 0
                },
            ]
        );
    }

    #[test]
    fn keeps_line_numbers_and_raw_text() {
        let sheet = CueSheet::new("\nFILE \"a.wav\" WAVE\n\n  TRACK 01 AUDIO  \n");
        let lines: Vec<CueLine> = sheet.commands().map(Result::unwrap).collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[1].number, 4);
        assert_eq!(lines[1].text, "TRACK 01 AUDIO");
    }

    #[test]
    fn commands_can_be_restarted() {
        let sheet = CueSheet::new("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00:00\n");

        let first: Vec<_> = sheet.commands().collect();
        let second: Vec<_> = sheet.commands().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn unknown_directives_are_captured() {
        assert_eq!(
            commands("REM UNSUPPORTED_TAG foo bar\nCDTEXTFILE \"x.cdt\"\nREM"),
            vec![
                CueCommand::Unknown("REM UNSUPPORTED_TAG foo bar".to_string()),
                CueCommand::Unknown("CDTEXTFILE \"x.cdt\"".to_string()),
                CueCommand::Unknown("REM".to_string()),
            ]
        );
    }

    #[test]
    fn rem_session_is_recognized() {
        assert_eq!(
            commands("REM SESSION 02"),
            vec![CueCommand::Rem(RemCommand::Session(2))]
        );
        assert_eq!(
            first_error("REM SESSION two").kind,
            MalformedKind::InvalidNumber("two".to_string())
        );
    }

    #[test]
    fn unquoted_file_names_keep_spaces() {
        assert_eq!(
            commands("FILE my song.wav WAVE"),
            vec![CueCommand::File {
                name: "my song.wav".to_string(),
                file_type: FileType::Wave
            }]
        );
    }

    #[test]
    fn malformed_lines_carry_line_and_text() {
        let err = first_error("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\n  INDEX 01 00:00:75\n");

        assert_eq!(err.line, 3);
        assert_eq!(err.text, "INDEX 01 00:00:75");
        assert_eq!(
            err.kind,
            MalformedKind::InvalidMSFFormat("00:00:75".to_string())
        );
    }

    #[test]
    fn oversized_timestamps_are_malformed() {
        let err = first_error("FILE \"a.wav\" WAVE\nINDEX 01 99999999:00:00\n");
        assert_eq!(err.line, 2);
        assert_eq!(err.text, "INDEX 01 99999999:00:00");
        assert_eq!(
            err.kind,
            MalformedKind::InvalidMSFFormat("99999999:00:00".to_string())
        );

        assert_eq!(
            first_error("PREGAP 954438:00:00").kind,
            MalformedKind::InvalidMSFFormat("954438:00:00".to_string())
        );
        assert_eq!(
            first_error("POSTGAP 4294967295:59:74").kind,
            MalformedKind::InvalidMSFFormat("4294967295:59:74".to_string())
        );
    }

    #[test]
    fn truncated_timestamps_are_malformed() {
        assert_eq!(
            first_error("INDEX 01 00:00").kind,
            MalformedKind::InvalidMSFFormat("00:00".to_string())
        );
        assert_eq!(
            first_error("PREGAP").kind,
            MalformedKind::MissingArgument("PREGAP")
        );
        assert_eq!(
            first_error("TRACK xx AUDIO").kind,
            MalformedKind::InvalidNumber("xx".to_string())
        );
        assert_eq!(
            first_error("TRACK 00 AUDIO").kind,
            MalformedKind::TrackNumberOutOfRange { number: 0 }
        );
    }

    #[test]
    fn rejects_unknown_types_and_bad_codes() {
        assert_eq!(
            first_error("FILE \"a.ogg\" OGG").kind,
            MalformedKind::InvalidFileType("OGG".to_string())
        );
        assert_eq!(
            first_error("TRACK 01 VIDEO").kind,
            MalformedKind::InvalidTrackType("VIDEO".to_string())
        );
        assert_eq!(
            first_error("CATALOG 12345").kind,
            MalformedKind::InvalidCatalog("12345".to_string())
        );
        assert_eq!(
            first_error("ISRC US-ABC").kind,
            MalformedKind::InvalidIsrc("US-ABC".to_string())
        );
        assert_eq!(
            first_error("FLAGS DCP XYZ").kind,
            MalformedKind::InvalidFlag("XYZ".to_string())
        );
        assert_eq!(
            first_error("TITLE \"unterminated").kind,
            MalformedKind::MissingQuote
        );
    }

    #[test]
    fn decodes_utf8_and_strips_bom() {
        let sheet = CueSheet::from_bytes("\u{feff}TITLE \"Café\"".as_bytes());
        assert_eq!(sheet.text(), "TITLE \"Café\"");
        assert_eq!(commands(sheet.text()), vec![CueCommand::Title("Café".to_string())]);
    }

    #[test]
    fn falls_back_to_latin1() {
        let sheet = CueSheet::from_bytes(b"TITLE \"Caf\xe9\"");
        assert_eq!(sheet.text(), "TITLE \"Café\"");
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            commands("track 03 audio\nindex 01 01:00:00"),
            vec![
                CueCommand::Track {
                    number: 3,
                    track_type: TrackType::Audio
                },
                CueCommand::Index {
                    number: 1,
                    position: 4_500
                },
            ]
        );
    }
}
