// src/wav/models
use binrw::{BinRead, BinWrite};

pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

pub const FMT_CHUNK_ID: [u8; 4] = *b"fmt ";
pub const DATA_CHUNK_ID: [u8; 4] = *b"data";

/// RIFF container header, 12 bytes, little-endian.
#[derive(Debug, Clone, BinRead, BinWrite)]
#[brw(little, magic = b"RIFF")]
pub struct RiffHeader {
    /// Size of the rest of the file, not including the magic and this field
    pub size: u32,

    /// Form type, must be `WAVE`
    #[br(assert(form == *b"WAVE", "RIFF form is not WAVE"))]
    pub form: [u8; 4],
}

/// Header preceding every RIFF sub-chunk.
#[derive(Debug, Clone, BinRead, BinWrite)]
#[brw(little)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    pub const SIZE: u64 = 8;

    /// Bytes to skip after the chunk body, chunks are padded to even sizes.
    pub fn padded_size(&self) -> u64 {
        u64::from(self.size) + u64::from(self.size & 1)
    }
}

/// Mandatory part of the `fmt ` chunk.
#[derive(Debug, Clone, BinRead, BinWrite)]
#[brw(little)]
pub struct FormatChunk {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    /// Bytes per sample frame, all channels included
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FormatChunk {
    pub const SIZE: u64 = 16;
}

/// WAVE_FORMAT_EXTENSIBLE tail of the `fmt ` chunk.
#[derive(Debug, Clone, BinRead, BinWrite)]
#[brw(little)]
pub struct FormatExtension {
    pub extension_size: u16,
    pub valid_bits_per_sample: u16,
    pub channel_mask: u32,
    /// Sub-format GUID, the first two bytes carry the real format tag
    pub sub_format: [u8; 16],
}

impl FormatExtension {
    pub const SIZE: u64 = 24;

    pub fn format_tag(&self) -> u16 {
        u16::from_le_bytes([self.sub_format[0], self.sub_format[1]])
    }
}
