use crate::built_info;
use crate::cd::Msf;
use crate::disc::models::{Disc, Pregap, Session, Track};
use std::fmt::{Display, Formatter, Result};
use std::path::Path;

const MODE_AUDIO: &str = "CD_DA";
const MODE_MULTI_SESSION: &str = "CD_ROM_XA";

/// Renders the disc as a cdrdao TOC file.
pub fn render(disc: &Disc) -> String {
    Toc(disc).to_string()
}

struct Toc<'a>(&'a Disc);

impl Display for Toc<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let disc = self.0;

        writeln!(
            f,
            "// Generated by {} {}",
            built_info::PKG_NAME,
            built_info::PKG_VERSION
        )?;
        if let Some(genre) = &disc.genre {
            writeln!(f, "// Genre: {genre}")?;
        }
        if let Some(date) = &disc.date {
            writeln!(f, "// Date: {date}")?;
        }

        let mode = if disc.is_multisession() {
            MODE_MULTI_SESSION
        } else {
            MODE_AUDIO
        };
        writeln!(f, "{mode}")?;

        if let Some(catalog) = &disc.catalog {
            writeln!(f, "CATALOG \"{}\"", quote(catalog))?;
        }

        writeln!(f, "CD_TEXT {{ LANGUAGE_MAP {{ 0:EN }}")?;
        writeln!(f, "\tLANGUAGE 0 {{")?;
        write_text(f, "\t\t", "TITLE", &disc.title)?;
        write_text(f, "\t\t", "PERFORMER", &disc.performer)?;
        write_text(f, "\t\t", "SONGWRITER", &disc.songwriter)?;
        write_text(f, "\t\t", "DISC_ID", &disc.disc_id)?;
        writeln!(f, "}}}}")?;

        for session in &disc.sessions {
            if disc.sessions.len() > 1 {
                write_session(f, session)?;
            }
            for track in &session.tracks {
                write_track(f, track)?;
            }
        }

        Ok(())
    }
}

fn write_session(f: &mut Formatter<'_>, session: &Session) -> Result {
    writeln!(f)?;
    writeln!(
        f,
        "// Session {} starts at {} (lead-in {}, lead-out {})",
        session.number,
        Msf::from_frames(session.base_offset),
        Msf::from_frames(session.lead_in),
        Msf::from_frames(session.lead_out)
    )
}

fn write_track(f: &mut Formatter<'_>, track: &Track) -> Result {
    writeln!(f)?;
    writeln!(f, "//Track {}", track.number)?;
    writeln!(f, "TRACK AUDIO")?;

    if let Some(isrc) = &track.isrc {
        writeln!(f, "\tISRC \"{}\"", quote(isrc))?;
    }
    if track.flags.dcp {
        writeln!(f, "\tCOPY")?;
    }
    if track.flags.four_channel {
        writeln!(f, "\tFOUR_CHANNEL_AUDIO")?;
    }
    if track.flags.pre_emphasis {
        writeln!(f, "\tPRE_EMPHASIS")?;
    }

    writeln!(f, "\tCD_TEXT {{ LANGUAGE 0 {{")?;
    write_text(f, "\t\t", "TITLE", &track.title)?;
    write_text(f, "\t\t", "PERFORMER", &track.performer)?;
    write_text(f, "\t\t", "SONGWRITER", &track.songwriter)?;
    writeln!(f, "\t}}}}")?;

    let position = track.index01_position();
    let path = &track.audio.path;

    match &track.pregap {
        Pregap::None => write_audio_file(f, path, position, track.length)?,
        Pregap::Silence { length } => {
            writeln!(f, "\tPREGAP {}", Msf::from_frames(*length))?;
            write_audio_file(f, path, position, track.length)?;
        }
        Pregap::Inline { length } => {
            write_audio_file(f, path, position - length, length + track.length)?;
            writeln!(f, "\tSTART {}", Msf::from_frames(*length))?;
        }
        Pregap::Split {
            audio,
            start,
            length,
        } => {
            write_audio_file(f, &audio.path, *start, *length)?;
            writeln!(f, "\tSTART")?;
            write_audio_file(f, path, position, track.length)?;
        }
    }

    for index in track.indices.iter().filter(|index| index.number > 1) {
        writeln!(f, "\tINDEX {}", Msf::from_frames(index.position - position))?;
    }

    if track.postgap > 0 {
        writeln!(f, "\tSILENCE {}", Msf::from_frames(track.postgap))?;
    }

    Ok(())
}

fn write_audio_file(f: &mut Formatter<'_>, path: &Path, start: u32, length: u32) -> Result {
    writeln!(
        f,
        "\tAUDIOFILE \"{}\" {} {}",
        quote(&path.to_string_lossy()),
        Msf::from_frames(start),
        Msf::from_frames(length)
    )
}

fn write_text(f: &mut Formatter<'_>, indent: &str, key: &str, value: &Option<String>) -> Result {
    match value {
        Some(value) => writeln!(f, "{indent}{key} \"{}\"", quote(value)),
        None => Ok(()),
    }
}

/// Escapes a value for a TOC string literal.
fn quote(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\t', "    ")
}
