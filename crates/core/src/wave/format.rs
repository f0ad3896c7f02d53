use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::{Result, WaveError};

/// Signature by which a format chunk can be recognized.
pub const SIGNATURE: &[u8; 4] = b"fmt ";

/// Format tag for uncompressed PCM audio.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
/// Format tag for uncompressed IEEE floating point audio.
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
/// Format tag announcing a [`WaveFormatExtensible`](super::WaveFormatExtensible) chunk.
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Shared behaviour of the three historical "fmt " chunk layouts.
///
/// Every layout starts with the same 8 byte header: the signature followed by
/// the little-endian length of the chunk body. Loading always reports the
/// length found on the wire, which may be larger than [`FormatChunk::SIZE`]
/// when the chunk carries vendor data after the known fields.
pub trait FormatChunk: Sized {
    /// Canonical length of the chunk body written by [`FormatChunk::save`].
    const SIZE: u32;

    /// Reads the chunk and returns it together with its declared length.
    fn load<R: Read>(reader: &mut R) -> Result<(Self, u32)>;

    /// Writes the chunk, declaring `chunk_size` as the length of its body.
    ///
    /// This always writes the known fields only; any bytes implied by a
    /// larger `chunk_size` are the caller's responsibility.
    fn save_with_size<W: Write>(&self, writer: &mut W, chunk_size: u32) -> Result<()>;

    /// The basic fields shared by every layout.
    fn wave_format(&self) -> &WaveFormat;

    /// Writes the chunk with its canonical length.
    fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.save_with_size(writer, Self::SIZE)
    }
}

/// Codec identifier stored in the format tag of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    Pcm,
    Adpcm,
    IeeeFloat,
    ALaw,
    MuLaw,
    Extensible,
    Unknown(u16),
}

impl From<u16> for FormatTag {
    fn from(val: u16) -> Self {
        match val {
            WAVE_FORMAT_PCM => FormatTag::Pcm,
            0x0002 => FormatTag::Adpcm,
            WAVE_FORMAT_IEEE_FLOAT => FormatTag::IeeeFloat,
            0x0006 => FormatTag::ALaw,
            0x0007 => FormatTag::MuLaw,
            WAVE_FORMAT_EXTENSIBLE => FormatTag::Extensible,
            other => FormatTag::Unknown(other),
        }
    }
}

impl From<FormatTag> for u16 {
    fn from(tag: FormatTag) -> Self {
        match tag {
            FormatTag::Pcm => WAVE_FORMAT_PCM,
            FormatTag::Adpcm => 0x0002,
            FormatTag::IeeeFloat => WAVE_FORMAT_IEEE_FLOAT,
            FormatTag::ALaw => 0x0006,
            FormatTag::MuLaw => 0x0007,
            FormatTag::Extensible => WAVE_FORMAT_EXTENSIBLE,
            FormatTag::Unknown(val) => val,
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTag::Pcm => f.write_str("PCM"),
            FormatTag::Adpcm => f.write_str("Microsoft ADPCM"),
            FormatTag::IeeeFloat => f.write_str("IEEE float"),
            FormatTag::ALaw => f.write_str("A-law"),
            FormatTag::MuLaw => f.write_str("mu-law"),
            FormatTag::Extensible => f.write_str("extensible"),
            FormatTag::Unknown(val) => write!(f, "unknown ({val:#06x})"),
        }
    }
}

/// Information stored in the original wave format chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveFormat {
    /// Wave format, mainly used to indicate the compression scheme.
    pub format_tag: u16,
    pub channel_count: u16,
    /// Playback sample frames per second.
    pub samples_per_second: u32,
    /// Average number of bytes per second during playback, including padding.
    ///
    /// Normally `samples_per_second * block_alignment`.
    pub average_bytes_per_second: u32,
    /// Size of a single sample frame, i.e. one sample for every channel.
    pub block_alignment: u16,
}

impl WaveFormat {
    /// Interprets the raw format tag.
    pub fn tag(&self) -> FormatTag {
        self.format_tag.into()
    }
}

impl FormatChunk for WaveFormat {
    const SIZE: u32 = 14;

    fn wave_format(&self) -> &WaveFormat {
        self
    }

    fn load<R: Read>(reader: &mut R) -> Result<(Self, u32)> {
        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature)?;
        if &signature != SIGNATURE {
            return Err(WaveError::SignatureMismatch { found: signature });
        }

        let chunk_length = reader.read_u32::<LittleEndian>()?;

        let format = WaveFormat {
            format_tag: reader.read_u16::<LittleEndian>()?,
            channel_count: reader.read_u16::<LittleEndian>()?,
            samples_per_second: reader.read_u32::<LittleEndian>()?,
            average_bytes_per_second: reader.read_u32::<LittleEndian>()?,
            block_alignment: reader.read_u16::<LittleEndian>()?,
        };

        Ok((format, chunk_length))
    }

    fn save_with_size<W: Write>(&self, writer: &mut W, chunk_size: u32) -> Result<()> {
        writer.write_all(SIGNATURE)?;
        writer.write_u32::<LittleEndian>(chunk_size)?;

        writer.write_u16::<LittleEndian>(self.format_tag)?;
        writer.write_u16::<LittleEndian>(self.channel_count)?;
        writer.write_u32::<LittleEndian>(self.samples_per_second)?;
        writer.write_u32::<LittleEndian>(self.average_bytes_per_second)?;
        writer.write_u16::<LittleEndian>(self.block_alignment)?;
        Ok(())
    }
}

/// Consumes whatever a chunk declares beyond the bytes already read from it.
///
/// `consumed` is the number of body bytes the caller has read. Chunks with an
/// odd declared length are followed by a pad byte, which is consumed as well.
/// Returns the number of bytes skipped.
pub fn skip_chunk_remainder<R: Read>(
    reader: &mut R,
    declared: u32,
    consumed: u32,
) -> Result<u64> {
    let remaining = u64::from(declared.saturating_sub(consumed)) + u64::from(declared & 1);
    if remaining == 0 {
        return Ok(0);
    }

    let skipped = io::copy(&mut reader.by_ref().take(remaining), &mut io::sink())?;
    if skipped < remaining {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("chunk ended after {skipped} of {remaining} trailing bytes"),
        )
        .into());
    }

    tracing::trace!(declared, consumed, skipped, "skipped trailing chunk bytes");
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const STANDARD_CHUNK: [u8; 22] = [
        0x66, 0x6D, 0x74, 0x20, 0x32, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x22, 0x56, 0x00,
        0x00, 0x27, 0x57, 0x00, 0x00, 0x00, 0x04,
    ];

    #[test]
    fn load_versus_save() {
        let original = WaveFormat {
            format_tag: 0x1A2B,
            channel_count: 42,
            samples_per_second: 123_456_789,
            average_bytes_per_second: 987_654_321,
            block_alignment: 1928,
        };

        let mut buffer = Vec::new();
        original.save(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 8 + WaveFormat::SIZE as usize);

        let (restored, chunk_length) = WaveFormat::load(&mut Cursor::new(&buffer)).unwrap();
        assert_eq!(chunk_length, WaveFormat::SIZE);
        assert_eq!(restored, original);

        let mut again = Vec::new();
        restored.save(&mut again).unwrap();
        assert_eq!(again, buffer);
    }

    #[test]
    fn rejects_non_wave_data() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let err = WaveFormat::load(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(
            err,
            WaveError::SignatureMismatch { found: [1, 2, 3, 4] }
        ));
    }

    #[test]
    fn loads_chunk_of_standard_wave_file() {
        let mut cursor = Cursor::new(&STANDARD_CHUNK[..]);
        let (format, chunk_length) = WaveFormat::load(&mut cursor).unwrap();

        assert_eq!(chunk_length, 50);
        assert_eq!(format.format_tag, 2);
        assert_eq!(format.tag(), FormatTag::Adpcm);
        assert_eq!(format.channel_count, 2);
        assert_eq!(format.samples_per_second, 22050);
        assert_eq!(format.average_bytes_per_second, 22311);
        assert_eq!(format.block_alignment, 1024);
        assert_eq!(cursor.position(), STANDARD_CHUNK.len() as u64);
    }

    #[test]
    fn keeps_declared_length_when_saving_with_size() {
        let format = WaveFormat {
            format_tag: WAVE_FORMAT_PCM,
            ..WaveFormat::default()
        };
        let mut buffer = Vec::new();
        format.save_with_size(&mut buffer, 16).unwrap();
        assert_eq!(&buffer[4..8], &[16, 0, 0, 0]);
        assert_eq!(buffer.len(), 8 + 14);
    }

    #[test]
    fn truncated_chunk_is_an_io_error() {
        let err = WaveFormat::load(&mut Cursor::new(&STANDARD_CHUNK[..15])).unwrap_err();
        assert!(err.is_truncated());

        let err = WaveFormat::load(&mut Cursor::new(&b"fm"[..])).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn permissive_about_field_values() {
        let zeroed = WaveFormat::default();
        let mut buffer = Vec::new();
        zeroed.save(&mut buffer).unwrap();
        let (restored, _) = WaveFormat::load(&mut Cursor::new(&buffer)).unwrap();
        assert_eq!(restored.channel_count, 0);
        assert_eq!(restored.samples_per_second, 0);
    }

    #[test]
    fn skips_trailing_bytes_and_pad() {
        let mut data = STANDARD_CHUNK.to_vec();
        data.extend_from_slice(&[0xAA; 36]);
        data.push(0xFF);
        let mut cursor = Cursor::new(&data);

        let (_, declared) = WaveFormat::load(&mut cursor).unwrap();
        let skipped = skip_chunk_remainder(&mut cursor, declared, WaveFormat::SIZE).unwrap();
        assert_eq!(skipped, 36);
        assert_eq!(cursor.position(), data.len() as u64 - 1);

        let mut odd = Cursor::new(vec![0u8; 4]);
        assert_eq!(skip_chunk_remainder(&mut odd, 3, 0).unwrap(), 4);
    }

    #[test]
    fn skipping_past_the_end_fails() {
        let mut cursor = Cursor::new(vec![0u8; 2]);
        let err = skip_chunk_remainder(&mut cursor, 20, 14).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn format_tag_conversion() {
        assert_eq!(u16::from(FormatTag::Extensible), 0xFFFE);
        assert_eq!(FormatTag::from(0x0003), FormatTag::IeeeFloat);
        assert_eq!(FormatTag::from(0x1234), FormatTag::Unknown(0x1234));
        assert_eq!(u16::from(FormatTag::Unknown(0x1234)), 0x1234);
    }
}
