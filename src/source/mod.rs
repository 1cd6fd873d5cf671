use crate::cue::CueSheet;
use crate::error::{CueTocError, CueTocResult};
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{self, AsyncReadExt, AsyncWriteExt};

/// Where the CUE data is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueSource {
    Stdin,
    File(PathBuf),
}

impl CueSource {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if path.as_os_str() != "-" => CueSource::File(path),
            _ => CueSource::Stdin,
        }
    }

    pub async fn read_all(&self) -> CueTocResult<CueSheet> {
        let data = match self {
            CueSource::Stdin => {
                debug!("Reading CUE data from stdin");
                let mut data = Vec::new();
                io::stdin().read_to_end(&mut data).await?;
                data
            }
            CueSource::File(path) => {
                debug!("Reading CUE file: {:?}", path);
                fs::read(path).await?
            }
        };

        Ok(CueSheet::from_bytes(&data))
    }

    /// Default directory for WAV lookups: next to the CUE file, or the
    /// current directory for stdin.
    pub fn search_dir(&self) -> PathBuf {
        match self {
            CueSource::File(path) => match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
            CueSource::Stdin => PathBuf::from("."),
        }
    }
}

/// Where the TOC text is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocSink {
    Stdout,
    File(PathBuf),
}

impl TocSink {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if path.as_os_str() != "-" => TocSink::File(path),
            _ => TocSink::Stdout,
        }
    }

    /// Refuses to replace an existing file unless `force` is set. Checked
    /// before any WAV file is probed.
    pub async fn check(&self, force: bool) -> CueTocResult<()> {
        if let TocSink::File(path) = self
            && !force
            && fs::try_exists(path).await?
        {
            return Err(CueTocError::OutputExists(path.clone()));
        }

        Ok(())
    }

    pub async fn write(&self, toc: &str, force: bool) -> CueTocResult<()> {
        self.check(force).await?;

        match self {
            TocSink::Stdout => {
                let mut stdout = io::stdout();
                stdout.write_all(toc.as_bytes()).await?;
                stdout.flush().await?;
            }
            TocSink::File(path) => {
                debug!("Writing TOC file: {:?}", path);
                write_file(path, toc).await?;
            }
        }

        Ok(())
    }
}

async fn write_file(path: &Path, toc: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, toc).await
}
