use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::channel_mask::ChannelMask;
use super::format::{FormatChunk, WaveFormat, WAVE_FORMAT_EXTENSIBLE};
use super::format_ex::WaveFormatEx;
use crate::Result;

/// Sample data is stored in analog format (unknown).
pub const KSDATAFORMAT_SUBTYPE_ANALOG: Uuid =
    Uuid::from_u128(0x6dba3190_67bd_11cf_a0f7_0020afd156e4);
/// Sample data is stored in uncompressed PCM format.
pub const KSDATAFORMAT_SUBTYPE_PCM: Uuid = Uuid::from_u128(0x00000001_0000_0010_8000_00aa00389b71);
/// Sample data is stored in uncompressed IEEE float format.
pub const KSDATAFORMAT_SUBTYPE_IEEE_FLOAT: Uuid =
    Uuid::from_u128(0x00000003_0000_0010_8000_00aa00389b71);

/// Information stored in an extensible wave format chunk.
///
/// The sub-format GUID is kept in its canonical form in memory and stored on
/// the wire in the Microsoft layout, where the first three groups are
/// little-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveFormatExtensible {
    /// Old style wave format description.
    pub format_ex: WaveFormatEx,
    /// Number of valid bits in each sample.
    ///
    /// May be less than the container's `bits_per_sample`, or 0 when all bits
    /// are used. Holds the samples per block instead when `bits_per_sample`
    /// is 0.
    pub valid_bits_per_sample: u16,
    pub channel_mask: ChannelMask,
    /// Actual sample data format, e.g. [`KSDATAFORMAT_SUBTYPE_PCM`].
    pub sub_format: Uuid,
}

impl WaveFormatExtensible {
    /// Describes integer PCM in an extensible chunk.
    pub fn pcm(
        channel_count: u16,
        samples_per_second: u32,
        bits_per_sample: u16,
        channel_mask: ChannelMask,
    ) -> Self {
        let mut format_ex = WaveFormatEx::pcm(channel_count, samples_per_second, bits_per_sample);
        format_ex.wave_format.format_tag = WAVE_FORMAT_EXTENSIBLE;
        format_ex.extra_information_size = (Self::SIZE - WaveFormatEx::SIZE) as u16;

        Self {
            format_ex,
            valid_bits_per_sample: bits_per_sample,
            channel_mask,
            sub_format: KSDATAFORMAT_SUBTYPE_PCM,
        }
    }

    /// Human readable name of the sub-format, if it is one of the known GUIDs.
    pub fn sub_format_name(&self) -> Option<&'static str> {
        [
            (KSDATAFORMAT_SUBTYPE_PCM, "PCM"),
            (KSDATAFORMAT_SUBTYPE_IEEE_FLOAT, "IEEE float"),
            (KSDATAFORMAT_SUBTYPE_ANALOG, "analog"),
        ]
        .into_iter()
        .find(|(guid, _)| *guid == self.sub_format)
        .map(|(_, name)| name)
    }
}

impl FormatChunk for WaveFormatExtensible {
    const SIZE: u32 = 40;

    fn wave_format(&self) -> &WaveFormat {
        &self.format_ex.wave_format
    }

    fn load<R: Read>(reader: &mut R) -> Result<(Self, u32)> {
        let (format_ex, chunk_length) = WaveFormatEx::load(reader)?;

        let valid_bits_per_sample = reader.read_u16::<LittleEndian>()?;
        let channel_mask = ChannelMask::from_bits(reader.read_u32::<LittleEndian>()?);

        let mut guid = [0u8; 16];
        reader.read_exact(&mut guid)?;

        let format = WaveFormatExtensible {
            format_ex,
            valid_bits_per_sample,
            channel_mask,
            sub_format: Uuid::from_bytes_le(guid),
        };

        Ok((format, chunk_length))
    }

    fn save_with_size<W: Write>(&self, writer: &mut W, chunk_size: u32) -> Result<()> {
        self.format_ex.save_with_size(writer, chunk_size)?;

        writer.write_u16::<LittleEndian>(self.valid_bits_per_sample)?;
        writer.write_u32::<LittleEndian>(self.channel_mask.bits())?;
        writer.write_all(&self.sub_format.to_bytes_le())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::wave::format::skip_chunk_remainder;
    use crate::WaveError;

    fn sample() -> WaveFormatExtensible {
        WaveFormatExtensible {
            format_ex: WaveFormatEx {
                wave_format: WaveFormat {
                    format_tag: WAVE_FORMAT_EXTENSIBLE,
                    channel_count: 6,
                    samples_per_second: 96_000,
                    average_bytes_per_second: 1_728_000,
                    block_alignment: 18,
                },
                bits_per_sample: 24,
                extra_information_size: 22,
            },
            valid_bits_per_sample: 20,
            channel_mask: ChannelMask::SURROUND_5_1,
            sub_format: KSDATAFORMAT_SUBTYPE_IEEE_FLOAT,
        }
    }

    #[test]
    fn load_versus_save() {
        let original = sample();

        let mut buffer = Vec::new();
        original.save(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 8 + WaveFormatExtensible::SIZE as usize);

        let (restored, chunk_length) =
            WaveFormatExtensible::load(&mut Cursor::new(&buffer)).unwrap();
        assert_eq!(chunk_length, 40);
        assert_eq!(restored, original);

        let mut again = Vec::new();
        restored.save(&mut again).unwrap();
        assert_eq!(again, buffer);
    }

    #[test]
    fn guid_uses_microsoft_byte_order() {
        let mut buffer = Vec::new();
        sample().save(&mut buffer).unwrap();

        assert_eq!(&buffer[28..32], &[0x3f, 0, 0, 0]);
        assert_eq!(
            &buffer[32..48],
            &[
                0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xaa, 0x00,
                0x38, 0x9b, 0x71
            ]
        );
    }

    #[test]
    fn pcm_constructor_fills_extension() {
        let format = WaveFormatExtensible::pcm(2, 48_000, 24, ChannelMask::STEREO);
        assert_eq!(format.format_ex.wave_format.format_tag, WAVE_FORMAT_EXTENSIBLE);
        assert_eq!(format.format_ex.extra_information_size, 22);
        assert_eq!(format.format_ex.wave_format.block_alignment, 6);
        assert_eq!(format.sub_format_name(), Some("PCM"));
    }

    #[test]
    fn reports_declared_length_beyond_known_fields() {
        let original = sample();
        let mut buffer = Vec::new();
        original.save_with_size(&mut buffer, 46).unwrap();
        buffer.extend_from_slice(&[0x5A; 6]);
        buffer.extend_from_slice(b"data");

        let mut cursor = Cursor::new(&buffer);
        let (restored, chunk_length) = WaveFormatExtensible::load(&mut cursor).unwrap();
        assert_eq!(chunk_length, 46);
        assert_eq!(restored, original);

        let skipped =
            skip_chunk_remainder(&mut cursor, chunk_length, WaveFormatExtensible::SIZE).unwrap();
        assert_eq!(skipped, 6);
        assert_eq!(&buffer[cursor.position() as usize..], b"data");
    }

    #[test]
    fn truncated_guid_is_an_io_error() {
        let mut buffer = Vec::new();
        sample().save(&mut buffer).unwrap();
        buffer.truncate(40);

        let err = WaveFormatExtensible::load(&mut Cursor::new(&buffer)).unwrap_err();
        assert!(matches!(err, WaveError::Io(_)));
        assert!(err.is_truncated());
    }
}
