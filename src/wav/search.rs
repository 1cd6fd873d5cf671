use crate::wav::error::{WavError, WavResult};
use async_recursion::async_recursion;
use log::debug;
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::OnceCell;

/// Upper bound of files visited while building the cache.
const MAX_CACHED_FILES: usize = 1000;

/// Locates the WAV files named by a CUE sheet below a search directory.
///
/// Exact paths win. Otherwise the directory is walked once and the cached
/// file list is searched for names containing the file stem, ignoring case,
/// extension and the difference between spaces and underscores.
#[derive(Debug)]
pub struct WavFileCache {
    src_dir: PathBuf,
    files: OnceCell<Vec<PathBuf>>,
}

impl WavFileCache {
    pub fn new(src_dir: impl AsRef<Path>) -> Self {
        Self {
            src_dir: src_dir.as_ref().to_path_buf(),
            files: OnceCell::new(),
        }
    }

    pub async fn lookup(&self, name: &str) -> WavResult<PathBuf> {
        debug!("Looking for WAV file '{name}'");

        // DOS paths are common in CUE files written on Windows
        let normalized = name.replace('\\', "/");
        let direct = self.src_dir.join(&normalized);
        if has_wav_extension(&direct) && fs::try_exists(&direct).await? {
            debug!("Found '{}'", direct.display());
            return Ok(direct);
        }

        let stem = Path::new(&normalized)
            .file_stem()
            .map(|stem| stem.to_string_lossy().trim().to_string())
            .unwrap_or_default();
        if stem.is_empty() {
            return Err(WavError::NotFound(direct));
        }

        let pattern = stem_pattern(&stem)?;
        let files = self.cached_files().await?;

        let matches: Vec<PathBuf> = files
            .iter()
            .filter(|file| file_name(file).is_some_and(|n| pattern.is_match(&n)))
            .cloned()
            .collect();

        match matches.len() {
            0 => Err(WavError::NotFound(direct)),
            1 => {
                debug!("Found '{}'", matches[0].display());
                Ok(matches[0].clone())
            }
            _ => {
                let exact: Vec<&PathBuf> = matches
                    .iter()
                    .filter(|file| {
                        file.file_stem()
                            .is_some_and(|s| s.to_string_lossy().eq_ignore_ascii_case(&stem))
                    })
                    .collect();

                if let [only] = exact.as_slice() {
                    debug!("Found '{}' among {} candidates", only.display(), matches.len());
                    return Ok((*only).clone());
                }

                Err(WavError::TooManyMatches {
                    name: name.to_string(),
                    matches,
                })
            }
        }
    }

    async fn cached_files(&self) -> WavResult<&Vec<PathBuf>> {
        self.files
            .get_or_try_init(|| async {
                debug!("Initializing WAV file cache at '{}'", self.src_dir.display());
                let mut files = get_all_files(&self.src_dir, MAX_CACHED_FILES).await?;
                files.retain(|file| has_wav_extension(file));
                files.sort();
                debug!("Found {} WAV files", files.len());
                Ok::<_, WavError>(files)
            })
            .await
    }
}

fn has_wav_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

fn stem_pattern(stem: &str) -> WavResult<Regex> {
    let mut variants = vec![
        regex::escape(stem),
        regex::escape(&stem.replace(' ', "_")),
        regex::escape(&stem.replace('_', " ")),
    ];
    variants.sort();
    variants.dedup();

    Ok(RegexBuilder::new(&variants.join("|"))
        .case_insensitive(true)
        .build()?)
}

#[async_recursion]
async fn get_all_files(dir_path: &Path, limit: usize) -> WavResult<Vec<PathBuf>> {
    let mut dir = fs::read_dir(dir_path).await?;
    let mut files = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        if files.len() >= limit {
            break;
        }

        let path = entry.path();

        if path.is_dir() {
            let remaining = limit - files.len();
            files.append(&mut get_all_files(&path, remaining).await?);
        } else {
            files.push(path);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[tokio::test]
    async fn finds_exact_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "01 - Intro.wav");

        let cache = WavFileCache::new(dir.path());
        assert_eq!(cache.lookup("01 - Intro.wav").await.unwrap(), path);
    }

    #[tokio::test]
    async fn converts_dos_paths_and_strips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "rip/01 - Intro.wav");

        let cache = WavFileCache::new(dir.path());
        assert_eq!(
            cache.lookup("C:\\Music\\Album\\01 - Intro.wav").await.unwrap(),
            path
        );
    }

    #[tokio::test]
    async fn matches_other_extensions_and_underscores() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "01_-_intro.WAV");
        touch(dir.path(), "cover.jpg");

        let cache = WavFileCache::new(dir.path());
        assert_eq!(cache.lookup("01 - Intro.flac").await.unwrap(), path);
    }

    #[tokio::test]
    async fn prefers_exact_stem_among_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "Song.wav");
        touch(dir.path(), "Song (Live).wav");

        let cache = WavFileCache::new(dir.path());
        assert_eq!(cache.lookup("Song.flac").await.unwrap(), path);
    }

    #[tokio::test]
    async fn reports_ambiguous_matches() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a/Song (Live).wav");
        touch(dir.path(), "b/Song (Demo).wav");

        let cache = WavFileCache::new(dir.path());
        match cache.lookup("Song.wav").await {
            Err(WavError::TooManyMatches { name, matches }) => {
                assert_eq!(name, "Song.wav");
                assert_eq!(matches.len(), 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "other.wav");

        let cache = WavFileCache::new(dir.path());
        assert!(matches!(
            cache.lookup("missing.wav").await,
            Err(WavError::NotFound(path)) if path == dir.path().join("missing.wav")
        ));
    }
}
