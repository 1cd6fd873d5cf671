use crate::cd::{SESSION_LEAD_IN_FRAMES, SESSION_LEAD_OUT_FRAMES};
use crate::disc::models::{Disc, Session};
use log::{debug, info};

/// Moves every session after the first behind the lead-out of its predecessor
/// and the lead-in of its own, the way a multi-session writer lays them out.
pub fn correct(mut disc: Disc) -> Disc {
    if disc.sessions.len() <= 1 || disc.corrected {
        return disc;
    }

    let last = disc.sessions.len() - 1;
    let mut previous_end = 0;

    for (idx, session) in disc.sessions.iter_mut().enumerate() {
        session.lead_in = if idx == 0 { 0 } else { SESSION_LEAD_IN_FRAMES };
        session.lead_out = if idx == last { 0 } else { SESSION_LEAD_OUT_FRAMES };

        session.base_offset = match idx {
            0 => 0,
            _ => previous_end + SESSION_LEAD_OUT_FRAMES + session.lead_in,
        };
        previous_end = session.end();

        debug!(
            "Session {} starts at frame {} (lead-in {}, lead-out {})",
            session.number, session.base_offset, session.lead_in, session.lead_out
        );
    }

    disc.corrected = true;
    disc
}

/// Merges all sessions into a single one with contiguous track starts. The
/// result is written as a plain audio disc.
pub fn flatten(mut disc: Disc) -> Disc {
    if !disc.is_multisession() {
        return disc;
    }

    info!(
        "Writing {} session(s) as a single audio session",
        disc.sessions.len()
    );

    let tracks = disc
        .sessions
        .drain(..)
        .flat_map(|session| session.tracks)
        .collect::<Vec<_>>();

    let mut session = Session::new(1, tracks);
    let mut cursor = 0;
    for track in session.tracks.iter_mut() {
        track.start = cursor + track.pregap.length();
        cursor += track.span();
    }

    disc.sessions.push(session);
    disc.has_data_tracks = false;
    disc.corrected = false;
    disc
}
