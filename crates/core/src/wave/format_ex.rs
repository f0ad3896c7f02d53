use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use super::format::{FormatChunk, WaveFormat, WAVE_FORMAT_PCM};
use crate::{Result, WaveError};

/// Information stored in an extended wave format chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveFormatEx {
    /// The basic format being extended.
    pub wave_format: WaveFormat,
    pub bits_per_sample: u16,
    /// Number of bytes of extra information appended to this structure.
    ///
    /// Redundant with the declared chunk length, which already covers them.
    pub extra_information_size: u16,
}

impl WaveFormatEx {
    /// Describes interleaved integer PCM with consistent derived fields.
    pub fn pcm(channel_count: u16, samples_per_second: u32, bits_per_sample: u16) -> Self {
        let mut format = Self {
            wave_format: WaveFormat {
                format_tag: WAVE_FORMAT_PCM,
                channel_count,
                samples_per_second,
                ..WaveFormat::default()
            },
            bits_per_sample,
            extra_information_size: 0,
        };
        format.wave_format.block_alignment = format.calculate_block_alignment();
        format.wave_format.average_bytes_per_second = format.calculate_average_bytes_per_second();
        format
    }

    /// `channel_count * ceil(bits_per_sample / 8)`.
    pub fn calculate_block_alignment(&self) -> u16 {
        let bytes_per_sample = self.bits_per_sample.div_ceil(8);
        self.wave_format.channel_count.saturating_mul(bytes_per_sample)
    }

    /// `samples_per_second * block_alignment`.
    pub fn calculate_average_bytes_per_second(&self) -> u32 {
        self.wave_format
            .samples_per_second
            .saturating_mul(u32::from(self.calculate_block_alignment()))
    }

    /// Checks that the fields describe playable integer PCM.
    ///
    /// Loading never calls this; decoded values are accepted as they are.
    pub fn validate(&self) -> Result<()> {
        let format = &self.wave_format;
        if format.channel_count == 0 {
            return Err(WaveError::invalid_input("channel count is 0"));
        }

        if format.samples_per_second == 0 {
            return Err(WaveError::invalid_input("sample rate is 0"));
        }

        if self.bits_per_sample == 0 {
            return Err(WaveError::invalid_input("bits per sample is 0"));
        }

        let expected = self.calculate_block_alignment();
        if format.block_alignment != expected {
            return Err(WaveError::invalid_input(format!(
                "block alignment mismatch: expected {expected}, got {}",
                format.block_alignment
            )));
        }

        Ok(())
    }
}

impl FormatChunk for WaveFormatEx {
    const SIZE: u32 = 18;

    fn wave_format(&self) -> &WaveFormat {
        &self.wave_format
    }

    fn load<R: Read>(reader: &mut R) -> Result<(Self, u32)> {
        let (wave_format, chunk_length) = WaveFormat::load(reader)?;

        let format = WaveFormatEx {
            wave_format,
            bits_per_sample: reader.read_u16::<LittleEndian>()?,
            extra_information_size: reader.read_u16::<LittleEndian>()?,
        };

        Ok((format, chunk_length))
    }

    fn save_with_size<W: Write>(&self, writer: &mut W, chunk_size: u32) -> Result<()> {
        self.wave_format.save_with_size(writer, chunk_size)?;

        writer.write_u16::<LittleEndian>(self.bits_per_sample)?;
        writer.write_u16::<LittleEndian>(self.extra_information_size)?;
        Ok(())
    }
}
