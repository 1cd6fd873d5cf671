use crate::cd::{CD_SAMPLE_RATE, FRAMES_PER_SECOND, samples_to_frames};
use crate::disc::models::{AudioProbe, AudioRef};
use crate::wav::error::{WavError, WavResult};
use crate::wav::models::{
    ChunkHeader, DATA_CHUNK_ID, FMT_CHUNK_ID, FormatChunk, FormatExtension, RiffHeader,
    WAVE_FORMAT_EXTENSIBLE, WAVE_FORMAT_PCM,
};
use crate::wav::search::WavFileCache;
use binrw::BinRead;
use log::{debug, warn};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::task;

pub mod error;
pub mod models;
pub mod search;

/// Source of frame counts and sample formats for the files a CUE sheet names.
#[allow(async_fn_in_trait)]
pub trait AudioInspector {
    /// Locates and probes the audio file named by a CUE `FILE` directive.
    async fn inspect(&self, name: &str) -> WavResult<AudioRef>;
}

/// Inspector backed by WAV files below a search directory.
#[derive(Debug)]
pub struct WavInspector {
    cache: WavFileCache,
}

impl WavInspector {
    pub fn new(search_dir: impl AsRef<Path>) -> Self {
        Self {
            cache: WavFileCache::new(search_dir),
        }
    }
}

impl AudioInspector for WavInspector {
    async fn inspect(&self, name: &str) -> WavResult<AudioRef> {
        let path = self.cache.lookup(name).await?;
        let probe = probe(&path).await?;

        if !probe.is_cd_audio() {
            warn!(
                "'{}' is not CD audio ({} Hz, {} channels, {} bits), the writer has to convert it",
                path.display(),
                probe.sample_rate,
                probe.channels,
                probe.bits_per_sample
            );
        }

        Ok(AudioRef {
            name: name.to_string(),
            path,
            probe,
        })
    }
}

/// Reads the header of a linear PCM WAV file.
pub async fn probe(path: impl AsRef<Path>) -> WavResult<AudioProbe> {
    let path: PathBuf = path.as_ref().to_path_buf();

    task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        let probe = read_probe(&mut BufReader::new(file))?;
        debug!(
            "Probed '{}': {} frames, {} Hz, {} channels, {} bits",
            path.display(),
            probe.total_frames,
            probe.sample_rate,
            probe.channels,
            probe.bits_per_sample
        );
        Ok(probe)
    })
    .await?
}

fn read_probe<R: Read + Seek>(reader: &mut R) -> WavResult<AudioProbe> {
    RiffHeader::read(reader)?;

    let mut format: Option<FormatChunk> = None;

    loop {
        let header = match ChunkHeader::read(reader) {
            Ok(header) => header,
            Err(e) if e.is_eof() => break,
            Err(e) => return Err(e.into()),
        };

        match header.id {
            FMT_CHUNK_ID => {
                format = Some(read_format_chunk(reader, &header)?);
            }
            DATA_CHUNK_ID => {
                let format = format.ok_or(WavError::MissingChunk("fmt "))?;
                return data_probe(&format, header.size);
            }
            _ => {
                debug!(
                    "Skipping '{}' chunk of {} bytes",
                    String::from_utf8_lossy(&header.id),
                    header.size
                );
                reader.seek(SeekFrom::Current(header.padded_size() as i64))?;
            }
        }
    }

    match format {
        Some(_) => Err(WavError::MissingChunk("data")),
        None => Err(WavError::MissingChunk("fmt ")),
    }
}

fn read_format_chunk<R: Read + Seek>(reader: &mut R, header: &ChunkHeader) -> WavResult<FormatChunk> {
    let chunk_size = u64::from(header.size);
    if chunk_size < FormatChunk::SIZE {
        return Err(WavError::InvalidFormatChunk(format!(
            "chunk is only {chunk_size} bytes"
        )));
    }

    let chunk = FormatChunk::read(reader)?;
    let mut consumed = FormatChunk::SIZE;

    let format_tag = if chunk.format_tag == WAVE_FORMAT_EXTENSIBLE {
        if chunk_size < FormatChunk::SIZE + FormatExtension::SIZE {
            return Err(WavError::InvalidFormatChunk(
                "truncated WAVE_FORMAT_EXTENSIBLE extension".to_string(),
            ));
        }
        let extension = FormatExtension::read(reader)?;
        consumed += FormatExtension::SIZE;
        extension.format_tag()
    } else {
        chunk.format_tag
    };

    if format_tag != WAVE_FORMAT_PCM {
        return Err(WavError::UnsupportedFormat(format_tag));
    }
    if chunk.sample_rate == 0 || chunk.block_align == 0 || chunk.channels == 0 {
        return Err(WavError::InvalidFormatChunk(format!(
            "{} Hz, {} channels, block align {}",
            chunk.sample_rate, chunk.channels, chunk.block_align
        )));
    }

    reader.seek(SeekFrom::Current((header.padded_size() - consumed) as i64))?;

    Ok(chunk)
}

fn data_probe(format: &FormatChunk, data_size: u32) -> WavResult<AudioProbe> {
    let samples = u64::from(data_size) / u64::from(format.block_align);
    let frames = samples_to_frames(samples, format.sample_rate);

    if format.sample_rate == CD_SAMPLE_RATE {
        let samples_per_frame = u64::from(CD_SAMPLE_RATE / FRAMES_PER_SECOND);
        let remainder = samples % samples_per_frame;
        if remainder != 0 {
            debug!("Audio data ends {remainder} samples past the last full frame");
        }
    }

    let total_frames = u32::try_from(frames).map_err(|_| WavError::TooLong(frames))?;

    Ok(AudioProbe {
        total_frames,
        sample_rate: format.sample_rate,
        channels: format.channels,
        bits_per_sample: format.bits_per_sample,
    })
}
