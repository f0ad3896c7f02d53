use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;

use super::extensible::{WaveFormatExtensible, KSDATAFORMAT_SUBTYPE_PCM};
use super::format::{
    skip_chunk_remainder, FormatChunk, WaveFormat, WAVE_FORMAT_EXTENSIBLE, WAVE_FORMAT_PCM,
};
use super::format_ex::WaveFormatEx;
use super::{ChunkHeader, DATA_CHUNK, FMT_CHUNK, RIFF_MAGIC, WAVE_MAGIC};
use crate::{Result, WaveError};

/// Format chunk as found in a file, in whichever layout its length allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum ParsedFormat {
    Basic(WaveFormat),
    Extended(WaveFormatEx),
    Extensible(WaveFormatExtensible),
}

impl ParsedFormat {
    /// Decodes a complete format chunk (header included).
    ///
    /// The richest layout that fits into the declared length is used; the
    /// extensible layout additionally requires the extensible format tag.
    pub fn load(chunk: &[u8]) -> Result<(Self, u32)> {
        let declared = chunk
            .get(4..8)
            .map_or(0, |len| u32::from_le_bytes([len[0], len[1], len[2], len[3]]));
        let format_tag = chunk
            .get(8..10)
            .map_or(0, |tag| u16::from_le_bytes([tag[0], tag[1]]));

        let mut cursor = Cursor::new(chunk);
        if declared >= WaveFormatExtensible::SIZE && format_tag == WAVE_FORMAT_EXTENSIBLE {
            let (format, length) = WaveFormatExtensible::load(&mut cursor)?;
            Ok((Self::Extensible(format), length))
        } else if declared >= WaveFormatEx::SIZE {
            let (format, length) = WaveFormatEx::load(&mut cursor)?;
            Ok((Self::Extended(format), length))
        } else {
            let (format, length) = WaveFormat::load(&mut cursor)?;
            Ok((Self::Basic(format), length))
        }
    }

    pub fn wave_format(&self) -> &WaveFormat {
        match self {
            Self::Basic(format) => format,
            Self::Extended(format) => &format.wave_format,
            Self::Extensible(format) => &format.format_ex.wave_format,
        }
    }

    /// Container bits per sample, unknown for the basic layout.
    pub fn bits_per_sample(&self) -> Option<u16> {
        match self {
            Self::Basic(_) => None,
            Self::Extended(format) => Some(format.bits_per_sample),
            Self::Extensible(format) => Some(format.format_ex.bits_per_sample),
        }
    }

    /// Whether the samples are plain integer PCM.
    pub fn is_pcm(&self) -> bool {
        match self {
            Self::Extensible(format) => format.sub_format == KSDATAFORMAT_SUBTYPE_PCM,
            other => other.wave_format().format_tag == WAVE_FORMAT_PCM,
        }
    }
}

/// Layout of a wave file as discovered by walking its chunks.
#[derive(Debug, Clone, Serialize)]
pub struct WaveInfo {
    /// Length declared by the RIFF header (file length minus 8).
    pub riff_length: u32,
    pub format: ParsedFormat,
    /// Length the format chunk declares for itself.
    pub format_chunk_length: u32,
    /// Absolute stream offset of the first sample byte.
    pub data_offset: u64,
    pub data_size: u32,
}

impl WaveInfo {
    /// Reads the RIFF header and locates the format and data chunks.
    ///
    /// Chunks other than "fmt " and "data" are skipped. The stream is left
    /// positioned somewhere after the last chunk that was examined.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut riff_header = [0u8; 12];
        reader.read_exact(&mut riff_header)?;
        if &riff_header[0..4] != RIFF_MAGIC || &riff_header[8..12] != WAVE_MAGIC {
            return Err(WaveError::NotRiff);
        }
        let riff_length =
            u32::from_le_bytes([riff_header[4], riff_header[5], riff_header[6], riff_header[7]]);

        let mut format = None;
        let mut data = None;

        while format.is_none() || data.is_none() {
            let Some(header) = ChunkHeader::read_next(reader)? else {
                break;
            };

            match &header.id {
                id if id == FMT_CHUNK => {
                    let mut chunk = Vec::with_capacity(8 + WaveFormatExtensible::SIZE as usize);
                    header.write(&mut chunk)?;
                    let read = reader
                        .by_ref()
                        .take(u64::from(header.size))
                        .read_to_end(&mut chunk)?;
                    if read < header.size as usize {
                        return Err(unexpected_eof());
                    }
                    skip_chunk_remainder(reader, header.size, header.size)?;

                    let (parsed, length) = ParsedFormat::load(&chunk)?;
                    tracing::debug!(?parsed, length, "loaded format chunk");
                    format = Some((parsed, length));
                }
                id if id == DATA_CHUNK => {
                    let offset = reader.stream_position()?;
                    data = Some((offset, header.size));
                    if format.is_none() {
                        skip_chunk(reader, &header)?;
                    }
                }
                _ => {
                    tracing::debug!(
                        id = %String::from_utf8_lossy(&header.id),
                        size = header.size,
                        "skipping chunk"
                    );
                    skip_chunk(reader, &header)?;
                }
            }
        }

        let (format, format_chunk_length) = format.ok_or(WaveError::MissingChunk("fmt "))?;
        let (data_offset, data_size) = data.ok_or(WaveError::MissingChunk("data"))?;

        Ok(WaveInfo {
            riff_length,
            format,
            format_chunk_length,
            data_offset,
            data_size,
        })
    }

    /// Number of sample frames in the data chunk.
    pub fn frame_count(&self) -> u64 {
        match self.format.wave_format().block_alignment {
            0 => 0,
            block => u64::from(self.data_size) / u64::from(block),
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        match self.format.wave_format().samples_per_second {
            0 => 0.0,
            rate => self.frame_count() as f64 / f64::from(rate),
        }
    }

    /// Reads the data chunk of a 16 bit PCM file back into one vector per channel.
    pub fn read_pcm16_samples<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<Vec<i16>>> {
        if !self.format.is_pcm() || self.format.bits_per_sample() != Some(16) {
            return Err(WaveError::invalid_input(
                "only 16 bit integer PCM sample data can be decoded",
            ));
        }

        let channel_count = usize::from(self.format.wave_format().channel_count);
        if channel_count == 0 {
            return Err(WaveError::invalid_input("format declares no channels"));
        }

        let frame_bytes = (channel_count * 2) as u64;
        let frames = u64::from(self.data_size) / frame_bytes;

        // The declared size is untrusted; reserve only what the stream holds.
        let stream_end = reader.seek(SeekFrom::End(0))?;
        let available = stream_end.saturating_sub(self.data_offset) / frame_bytes;
        let reserved = frames.min(available) as usize;
        let mut channels: Vec<Vec<i16>> = (0..channel_count)
            .map(|_| Vec::with_capacity(reserved))
            .collect();

        reader.seek(SeekFrom::Start(self.data_offset))?;
        for _ in 0..frames {
            for channel in channels.iter_mut() {
                channel.push(reader.read_i16::<LittleEndian>()?);
            }
        }

        Ok(channels)
    }
}

fn unexpected_eof() -> WaveError {
    std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into()
}

/// Skips a chunk body, honouring the word alignment of RIFF chunks.
fn skip_chunk<R: Seek>(reader: &mut R, header: &ChunkHeader) -> Result<()> {
    reader.seek(SeekFrom::Current(header.padded_size() as i64))?;
    Ok(())
}
