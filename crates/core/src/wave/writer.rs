use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::FormatChunk;
use super::{ChunkHeader, CHUNK_HEADER_SIZE, DATA_CHUNK, RIFF_MAGIC, WAVE_MAGIC};
use crate::{Result, WaveError};

/// Writes the building blocks of a Windows compatible wave file.
///
/// The writer does not track what has been written; callers are expected to
/// emit the file header, a format chunk and a data chunk in that order, or use
/// [`WaveWriter::write_pcm16`] which does all three.
#[derive(Debug)]
pub struct WaveWriter<W: Write> {
    inner: W,
}

impl<W: Write> WaveWriter<W> {
    /// Size of the wave file header (`RIFF` + file length + `WAVE`).
    pub const FILE_HEADER_SIZE: u32 = 12;

    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes the global RIFF header for a file of `file_length` total bytes.
    pub fn write_file_header(&mut self, file_length: u32) -> Result<()> {
        let riff_length = file_length.checked_sub(CHUNK_HEADER_SIZE).ok_or_else(|| {
            WaveError::invalid_input(format!(
                "file length {file_length} is shorter than the RIFF chunk header"
            ))
        })?;

        self.inner.write_all(RIFF_MAGIC)?;
        self.inner.write_u32::<LittleEndian>(riff_length)?;
        self.inner.write_all(WAVE_MAGIC)?;
        Ok(())
    }

    /// Writes a format chunk in any of its layouts.
    pub fn write_format_chunk<F: FormatChunk>(&mut self, format: &F) -> Result<()> {
        format.save(&mut self.inner)
    }

    /// Writes a data chunk of 16 bit samples, given one slice per channel.
    ///
    /// Samples are interleaved so that each frame holds one sample of every
    /// channel. Returns the size of the chunk body in bytes.
    pub fn write_data_chunk<C: AsRef<[i16]>>(&mut self, channels: &[C]) -> Result<u32> {
        let frames = frame_count(channels)?;
        let data_size = pcm16_data_size(channels.len(), frames)?;

        ChunkHeader {
            id: *DATA_CHUNK,
            size: data_size,
        }
        .write(&mut self.inner)?;

        let mut interleaved = Vec::with_capacity(data_size as usize);
        for frame in 0..frames {
            for channel in channels {
                interleaved.write_i16::<LittleEndian>(channel.as_ref()[frame])?;
            }
        }
        self.inner.write_all(&interleaved)?;

        tracing::debug!(channels = channels.len(), frames, data_size, "wrote data chunk");
        Ok(data_size)
    }

    /// Writes a complete 16 bit PCM wave file: header, format and data chunk.
    ///
    /// The number of sample slices has to match the channel count declared by
    /// `format`.
    pub fn write_pcm16<F, C>(&mut self, format: &F, channels: &[C]) -> Result<()>
    where
        F: FormatChunk,
        C: AsRef<[i16]>,
    {
        let declared = format.wave_format().channel_count;
        if usize::from(declared) != channels.len() {
            return Err(WaveError::invalid_input(format!(
                "format declares {declared} channels but {} were supplied",
                channels.len()
            )));
        }

        let data_size = pcm16_data_size(channels.len(), frame_count(channels)?)?;
        let file_length = [
            Self::FILE_HEADER_SIZE,
            CHUNK_HEADER_SIZE,
            F::SIZE,
            CHUNK_HEADER_SIZE,
            data_size,
        ]
        .into_iter()
        .try_fold(0u32, u32::checked_add)
        .ok_or_else(|| WaveError::invalid_input("wave file would exceed 4 GiB"))?;

        self.write_file_header(file_length)?;
        self.write_format_chunk(format)?;
        self.write_data_chunk(channels)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Releases the underlying stream without closing it.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn frame_count<C: AsRef<[i16]>>(channels: &[C]) -> Result<usize> {
    let frames = channels.first().map_or(0, |channel| channel.as_ref().len());
    if let Some(index) = channels.iter().position(|c| c.as_ref().len() != frames) {
        return Err(WaveError::invalid_input(format!(
            "channel {index} has {} samples, expected {frames}",
            channels[index].as_ref().len()
        )));
    }
    Ok(frames)
}

fn pcm16_data_size(channels: usize, frames: usize) -> Result<u32> {
    channels
        .checked_mul(frames)
        .and_then(|samples| samples.checked_mul(2))
        .and_then(|bytes| u32::try_from(bytes).ok())
        .ok_or_else(|| WaveError::invalid_input("sample data exceeds 4 GiB"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::wave::{WaveFormat, WaveFormatEx};

    #[test]
    fn writes_file_header() {
        let mut writer = WaveWriter::new(Vec::new());
        writer.write_file_header(1000).unwrap();

        let bytes = writer.into_inner();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[4..8], &992u32.to_le_bytes());
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn rejects_impossible_file_length() {
        let mut writer = WaveWriter::new(Vec::new());
        let err = writer.write_file_header(4).unwrap_err();
        assert!(matches!(err, WaveError::InvalidInput(_)));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn interleaves_samples_by_frame() {
        let left = [1i16, 2, 3];
        let right = [-1i16, -2, -3];
        let mut writer = WaveWriter::new(Vec::new());
        let size = writer.write_data_chunk(&[&left[..], &right[..]]).unwrap();
        assert_eq!(size, 12);

        let bytes = writer.into_inner();
        assert_eq!(&bytes[0..4], b"data");
        assert_eq!(&bytes[4..8], &12u32.to_le_bytes());

        let samples: Vec<i16> = bytes[8..]
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        assert_eq!(samples, vec![1, -1, 2, -2, 3, -3]);
    }

    #[test]
    fn rejects_ragged_channels() {
        let mut writer = WaveWriter::new(Vec::new());
        let err = writer
            .write_data_chunk(&[vec![0i16; 4], vec![0i16; 3]])
            .unwrap_err();
        assert!(err.to_string().contains("channel 1 has 3 samples, expected 4"));
    }

    #[test]
    fn writes_format_chunk_through_trait() {
        let mut writer = WaveWriter::new(Vec::new());
        writer.write_format_chunk(&WaveFormatEx::pcm(1, 8000, 16)).unwrap();

        let bytes = writer.into_inner();
        let (format, length) = WaveFormatEx::load(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(length, 18);
        assert_eq!(format.wave_format.samples_per_second, 8000);
    }

    #[test]
    fn complete_file_declares_consistent_lengths() {
        let format = WaveFormatEx::pcm(2, 22_050, 16);
        let samples = [vec![100i16; 10], vec![-100i16; 10]];

        let mut writer = WaveWriter::new(Vec::new());
        writer.write_pcm16(&format, &samples).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(bytes.len(), 12 + 8 + 18 + 8 + 40);
        let riff_length = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(riff_length as usize, bytes.len() - 8);
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[38..42], b"data");
    }

    #[test]
    fn complete_file_requires_matching_channel_count() {
        let format = WaveFormat {
            channel_count: 2,
            ..WaveFormat::default()
        };
        let mut writer = WaveWriter::new(Vec::new());
        let err = writer.write_pcm16(&format, &[vec![0i16; 2]]).unwrap_err();
        assert!(matches!(err, WaveError::InvalidInput(_)));
    }
}
