//! Core library for reading and writing RIFF WAVE files.
//!
//! The heart of the crate is the "fmt " chunk codec in [`wave`], which
//! understands the original, extended and extensible layouts of the chunk.
//! Around it sit a writer for complete 16 bit PCM files, a chunk walker that
//! inspects existing files, and a small test-tone generator used by the
//! command line front end.

pub mod config;
pub mod error;
pub mod tone;
pub mod wave;

pub use config::{AppConfig, ToneConfig};
pub use error::{Result, WaveError};
pub use tone::{render_tone, write_tone};
pub use wave::{
    ChannelMask, FormatChunk, FormatTag, ParsedFormat, WaveFormat, WaveFormatEx,
    WaveFormatExtensible, WaveInfo, WaveWriter,
};
