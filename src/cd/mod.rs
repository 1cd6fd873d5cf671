// src/cd/mod.rs
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

pub const FRAMES_PER_SECOND: u32 = 75;
pub const SECONDS_PER_MINUTE: u32 = 60;
pub const FRAMES_PER_MINUTE: u32 = FRAMES_PER_SECOND * SECONDS_PER_MINUTE;

/// Sample rate of Red Book audio, 588 samples per frame.
pub const CD_SAMPLE_RATE: u32 = 44_100;
pub const CD_CHANNELS: u16 = 2;
pub const CD_BITS_PER_SAMPLE: u16 = 16;

/// Lead-out written after every session but the last. 11400 frames (2:32:00)
/// is the inter-session gap AccurateRip and CDDB assume for multi-session
/// (enhanced) discs: 6750 frames of lead-out, 4500 frames of lead-in and the
/// 150 frame pregap of the next session's first track (Orange Book, part II).
pub const SESSION_LEAD_OUT_FRAMES: u32 = 11_400;

/// Lead-in of every session after the first, 60 seconds (Orange Book, part II).
pub const SESSION_LEAD_IN_FRAMES: u32 = 4_500;

/// A CD time position in minutes, seconds and frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Msf {
    pub minutes: u32,
    pub seconds: u8,
    pub frames: u8,
}

impl Msf {
    pub fn new_checked(minutes: u32, seconds: u8, frames: u8) -> Option<Self> {
        (u32::from(seconds) < SECONDS_PER_MINUTE && u32::from(frames) < FRAMES_PER_SECOND).then_some(
            Self {
                minutes,
                seconds,
                frames,
            },
        )
    }

    pub fn from_frames(frames: u32) -> Self {
        Self {
            minutes: frames / FRAMES_PER_MINUTE,
            seconds: ((frames / FRAMES_PER_SECOND) % SECONDS_PER_MINUTE) as u8,
            frames: (frames % FRAMES_PER_SECOND) as u8,
        }
    }

    /// Frame count, `None` past the range of a `u32` frame address.
    pub fn checked_to_frames(self) -> Option<u32> {
        self.minutes
            .checked_mul(SECONDS_PER_MINUTE)?
            .checked_add(u32::from(self.seconds))?
            .checked_mul(FRAMES_PER_SECOND)?
            .checked_add(u32::from(self.frames))
    }

    /// Frame count, saturating at `u32::MAX`. Values built by `from_frames`
    /// or parsed with `FromStr` always fit.
    pub fn to_frames(self) -> u32 {
        self.checked_to_frames().unwrap_or(u32::MAX)
    }
}

impl Display for Msf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.minutes, self.seconds, self.frames)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid MSF format: {0}")]
pub struct InvalidMsf(pub String);

impl FromStr for Msf {
    type Err = InvalidMsf;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMsf(s.to_string());

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }
        if !parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
            return Err(invalid());
        }

        let minutes = parts[0].parse::<u32>().map_err(|_| invalid())?;
        let seconds = parts[1].parse::<u8>().map_err(|_| invalid())?;
        let frames = parts[2].parse::<u8>().map_err(|_| invalid())?;

        let msf = Self::new_checked(minutes, seconds, frames).ok_or_else(invalid)?;
        msf.checked_to_frames().ok_or_else(invalid)?;
        Ok(msf)
    }
}

/// Number of whole CD frames covered by `samples` at `sample_rate`.
pub fn samples_to_frames(samples: u64, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    samples * u64::from(FRAMES_PER_SECOND) / u64::from(sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msf_converts_to_frames() {
        assert_eq!(Msf::from_str("00:00:00").unwrap().to_frames(), 0);
        assert_eq!(Msf::from_str("03:00:00").unwrap().to_frames(), 13_500);
        assert_eq!(Msf::from_str("00:02:00").unwrap().to_frames(), 150);
        assert_eq!(Msf::from_str("04:10:20").unwrap().to_frames(), 18_770);
    }

    #[test]
    fn msf_from_frames_is_exact() {
        for frames in [0, 1, 74, 75, 4_499, 4_500, 13_500, 18_770, 359_999] {
            let msf = Msf::from_frames(frames);
            assert_eq!(msf.to_frames(), frames);
            assert_eq!(msf.to_string().parse::<Msf>().unwrap().to_frames(), frames);
        }
    }

    #[test]
    fn msf_display_pads_fields() {
        assert_eq!(Msf::from_frames(18_770).to_string(), "04:10:20");
        assert_eq!(Msf::from_frames(6_750 * 20).to_string(), "30:00:00");
        assert_eq!(Msf::from_frames(100 * FRAMES_PER_MINUTE + 1).to_string(), "100:00:01");
    }

    #[test]
    fn msf_rejects_out_of_range_fields() {
        assert!(Msf::from_str("00:00:75").is_err());
        assert!(Msf::from_str("00:60:00").is_err());
        assert!(Msf::from_str("00:00").is_err());
        assert!(Msf::from_str("00:00:").is_err());
        assert!(Msf::from_str("aa:00:00").is_err());
        assert!(Msf::from_str("00:-1:00").is_err());
    }

    #[test]
    fn msf_rejects_times_past_the_frame_range() {
        assert!(Msf::from_str("99999999:00:00").is_err());
        assert!(Msf::from_str("954438:00:00").is_err());
        assert!(Msf::from_str("954437:10:46").is_err());
        assert_eq!(Msf::from_str("954437:10:45").unwrap().to_frames(), u32::MAX);
        assert_eq!(Msf::from_frames(u32::MAX).to_frames(), u32::MAX);
    }

    #[test]
    fn samples_to_frames_truncates_partial_frames() {
        assert_eq!(samples_to_frames(588, CD_SAMPLE_RATE), 1);
        assert_eq!(samples_to_frames(587, CD_SAMPLE_RATE), 0);
        assert_eq!(samples_to_frames(44_100 * 360, CD_SAMPLE_RATE), 27_000);
        assert_eq!(samples_to_frames(48_000, 48_000), 75);
        assert_eq!(samples_to_frames(10, 0), 0);
    }
}
