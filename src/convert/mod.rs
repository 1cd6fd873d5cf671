use crate::cue::CueSheet;
use crate::disc::DiscBuilder;
use crate::disc::models::Disc;
use crate::disc::session::{correct, flatten};
use crate::error::{CueTocError, CueTocResult};
use crate::source::{CueSource, TocSink};
use crate::toc::render;
use crate::wav::{AudioInspector, WavInspector};
use log::{debug, info, warn};
use std::path::PathBuf;

/// How a disc with more than one session (or with data tracks) is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Fail unless the caller confirmed multi-session output
    #[default]
    RequireConfirmation,
    /// Keep sessions, offsetting each one behind its predecessor's lead-out
    Multi,
    /// Merge everything into one audio session
    Single,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Directory searched for WAV files, defaults to the CUE file's directory
    pub search_dir: Option<PathBuf>,
    pub session_policy: SessionPolicy,
    /// Overwrite an existing TOC file
    pub force: bool,
}

pub async fn convert_cue(source: &CueSource, sink: &TocSink, options: &ConvertOptions) -> CueTocResult<()> {
    sink.check(options.force).await?;

    let sheet = source.read_all().await?;
    let search_dir = options
        .search_dir
        .clone()
        .unwrap_or_else(|| source.search_dir());
    debug!("Searching WAV files in {:?}", search_dir);

    let inspector = WavInspector::new(&search_dir);
    let toc = cue_to_toc(&sheet, &inspector, options.session_policy).await?;

    sink.write(&toc, options.force).await?;
    info!("TOC written for {} track(s)", count_tracks(&toc));
    Ok(())
}

pub async fn convert_wav_files(names: &[String], sink: &TocSink, options: &ConvertOptions) -> CueTocResult<()> {
    if names.is_empty() {
        return Err(CueTocError::NoWavFiles);
    }
    sink.check(options.force).await?;

    let search_dir = options
        .search_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let inspector = WavInspector::new(&search_dir);
    let toc = wav_files_to_toc(names, &inspector).await?;

    sink.write(&toc, options.force).await?;
    info!("TOC written for {} track(s)", count_tracks(&toc));
    Ok(())
}

/// Parses, builds, applies the session policy and renders, without touching
/// the output.
pub async fn cue_to_toc<I: AudioInspector>(
    sheet: &CueSheet,
    inspector: &I,
    policy: SessionPolicy,
) -> CueTocResult<String> {
    let disc = DiscBuilder::new(inspector).build(sheet).await?;
    let disc = apply_session_policy(disc, policy)?;
    Ok(render(&disc))
}

pub async fn wav_files_to_toc<I: AudioInspector>(names: &[String], inspector: &I) -> CueTocResult<String> {
    let disc = DiscBuilder::new(inspector).build_from_files(names).await?;
    Ok(render(&disc))
}

pub fn apply_session_policy(disc: Disc, policy: SessionPolicy) -> CueTocResult<Disc> {
    if !disc.is_multisession() {
        return Ok(disc);
    }

    match policy {
        SessionPolicy::RequireConfirmation => Err(CueTocError::MultiSessionNotConfirmed),
        SessionPolicy::Multi => {
            warn!(
                "Writing a multi-session TOC: burn it with 'cdrdao write --multi' onto a disc that already holds the previous session"
            );
            Ok(correct(disc))
        }
        SessionPolicy::Single => Ok(flatten(disc)),
    }
}

fn count_tracks(toc: &str) -> usize {
    toc.lines().filter(|line| *line == "TRACK AUDIO").count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::error::DiscError;
    use crate::disc::tests::FakeInspector;
    use crate::wav::tests::write_wav;

    const ENHANCED_CD: &str = r#"REM SESSION 01
FILE "a.wav" WAVE
  TRACK 01 AUDIO
    INDEX 01 00:00:00
REM SESSION 02
FILE "data.bin" BINARY
  TRACK 02 MODE2/2352
    INDEX 01 00:00:00
"#;

    #[tokio::test]
    async fn multisession_requires_confirmation() {
        let inspector = FakeInspector::new(&[("a.wav", 750)]);
        let sheet = CueSheet::new(ENHANCED_CD);

        assert!(matches!(
            cue_to_toc(&sheet, &inspector, SessionPolicy::RequireConfirmation).await,
            Err(CueTocError::MultiSessionNotConfirmed)
        ));

        let toc = cue_to_toc(&sheet, &inspector, SessionPolicy::Multi)
            .await
            .unwrap();
        assert!(toc.contains("\nCD_ROM_XA\n"));

        let toc = cue_to_toc(&sheet, &inspector, SessionPolicy::Single)
            .await
            .unwrap();
        assert!(toc.contains("\nCD_DA\n"));
    }

    #[tokio::test]
    async fn single_session_ignores_policy() {
        let inspector = FakeInspector::new(&[("a.wav", 750)]);
        let sheet = CueSheet::new("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00:00\n");

        let strict = cue_to_toc(&sheet, &inspector, SessionPolicy::RequireConfirmation)
            .await
            .unwrap();
        let multi = cue_to_toc(&sheet, &inspector, SessionPolicy::Multi)
            .await
            .unwrap();
        assert_eq!(strict, multi);
    }

    #[tokio::test]
    async fn converts_cue_file_next_to_its_wavs() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join("01 - Intro.wav"), 150);
        write_wav(&dir.path().join("02 - Outro.wav"), 300);
        let cue_path = dir.path().join("album.cue");
        std::fs::write(
            &cue_path,
            "FILE \"01 - Intro.flac\" WAVE\n  TRACK 01 AUDIO\n    INDEX 01 00:00:00\nFILE \"02 - Outro.flac\" WAVE\n  TRACK 02 AUDIO\n    INDEX 01 00:00:00\n",
        )
        .unwrap();
        let toc_path = dir.path().join("album.toc");

        convert_cue(
            &CueSource::File(cue_path),
            &TocSink::File(toc_path.clone()),
            &ConvertOptions::default(),
        )
        .await
        .unwrap();

        let toc = std::fs::read_to_string(&toc_path).unwrap();
        assert_eq!(count_tracks(&toc), 2);
        assert!(toc.contains("02 - Outro.wav\" 00:00:00 00:04:00"));
    }

    #[tokio::test]
    async fn missing_wav_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let cue_path = dir.path().join("album.cue");
        std::fs::write(
            &cue_path,
            "FILE \"missing.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00:00\n",
        )
        .unwrap();
        let toc_path = dir.path().join("album.toc");

        let result = convert_cue(
            &CueSource::File(cue_path),
            &TocSink::File(toc_path.clone()),
            &ConvertOptions::default(),
        )
        .await;

        assert!(matches!(
            result,
            Err(CueTocError::DiscError(DiscError::WavSearch(_)))
        ));
        assert!(!toc_path.exists());
    }

    #[tokio::test]
    async fn converts_wav_list() {
        let inspector = FakeInspector::new(&[("1.wav", 75), ("2.wav", 150)]);
        let names = vec!["1.wav".to_string(), "2.wav".to_string()];

        let toc = wav_files_to_toc(&names, &inspector).await.unwrap();
        assert!(toc.contains("\tAUDIOFILE \"1.wav\" 00:00:00 00:01:00\n"));
        assert!(toc.contains("\tAUDIOFILE \"2.wav\" 00:00:00 00:02:00\n"));
    }

    #[tokio::test]
    async fn empty_wav_list_is_rejected() {
        assert!(matches!(
            convert_wav_files(&[], &TocSink::Stdout, &ConvertOptions::default()).await,
            Err(CueTocError::NoWavFiles)
        ));
    }
}
