//! RIFF WAVE support.
//!
//! The "fmt " chunk comes in three historical layouts, each one a strict
//! extension of the previous:
//!
//! | offset | size | field                          | layout       |
//! | -----: | ---: | ------------------------------ | ------------ |
//! |      0 |    4 | `"fmt "`                       | all          |
//! |      4 |    4 | declared chunk length          | all          |
//! |      8 |    2 | format tag                     | all          |
//! |     10 |    2 | channel count                  | all          |
//! |     12 |    4 | samples per second             | all          |
//! |     16 |    4 | average bytes per second       | all          |
//! |     20 |    2 | block alignment                | all          |
//! |     22 |    2 | bits per sample                | ex           |
//! |     24 |    2 | extra information size         | ex           |
//! |     26 |    2 | valid bits per sample          | extensible   |
//! |     28 |    4 | channel mask                   | extensible   |
//! |     32 |   16 | sub-format GUID                | extensible   |
//!
//! All integers are little-endian.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::Result;

pub mod channel_mask;
pub mod extensible;
pub mod format;
pub mod format_ex;
pub mod reader;
pub mod writer;

pub use channel_mask::ChannelMask;
pub use extensible::{
    WaveFormatExtensible, KSDATAFORMAT_SUBTYPE_ANALOG, KSDATAFORMAT_SUBTYPE_IEEE_FLOAT,
    KSDATAFORMAT_SUBTYPE_PCM,
};
pub use format::{
    skip_chunk_remainder, FormatChunk, FormatTag, WaveFormat, WAVE_FORMAT_EXTENSIBLE,
    WAVE_FORMAT_IEEE_FLOAT, WAVE_FORMAT_PCM,
};
pub use format_ex::WaveFormatEx;
pub use reader::{ParsedFormat, WaveInfo};
pub use writer::WaveWriter;

pub const RIFF_MAGIC: &[u8; 4] = b"RIFF";
pub const WAVE_MAGIC: &[u8; 4] = b"WAVE";
pub const FMT_CHUNK: &[u8; 4] = format::SIGNATURE;
pub const DATA_CHUNK: &[u8; 4] = b"data";

/// Size of a chunk header (4 byte id + 4 byte length).
pub const CHUNK_HEADER_SIZE: u32 = 8;

/// Id and declared body length that open every RIFF chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    /// Reads the next chunk header, or `None` when the stream ends cleanly
    /// before the first byte of a header.
    ///
    /// A stream that ends inside the header is reported as truncated.
    pub fn read_next<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let first = match reader.read_u8() {
            Ok(byte) => byte,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut id = [first, 0, 0, 0];
        reader.read_exact(&mut id[1..])?;
        let size = reader.read_u32::<LittleEndian>()?;

        Ok(Some(ChunkHeader { id, size }))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.id)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        Ok(())
    }

    /// Body length including the pad byte that follows odd-sized chunks.
    pub fn padded_size(&self) -> u64 {
        u64::from(self.size) + u64::from(self.size & 1)
    }
}
