use std::f32::consts::TAU;
use std::io::Write;

use crate::config::ToneConfig;
use crate::wave::{ChannelMask, WaveFormatEx, WaveFormatExtensible, WaveWriter};
use crate::{Result, WaveError};

/// Renders a sine tone, returning the same signal for every channel.
pub fn render_tone(config: &ToneConfig) -> Result<Vec<Vec<i16>>> {
    if config.channels == 0 {
        return Err(WaveError::invalid_input("tone needs at least one channel"));
    }
    if config.sample_rate == 0 {
        return Err(WaveError::invalid_input("tone needs a non-zero sample rate"));
    }
    if !config.seconds.is_finite() || config.seconds < 0.0 {
        return Err(WaveError::invalid_input(format!(
            "invalid tone duration {}",
            config.seconds
        )));
    }

    // Saturating float to integer cast; anything that large fails the size check.
    let frames = (f64::from(config.seconds) * f64::from(config.sample_rate)).round() as u64;
    let data_size = frames
        .checked_mul(u64::from(config.channels))
        .and_then(|samples| samples.checked_mul(2));
    if !data_size.is_some_and(|bytes| bytes <= u64::from(u32::MAX)) {
        return Err(WaveError::invalid_input(format!(
            "a {} s tone at {} Hz does not fit into a wave file",
            config.seconds, config.sample_rate
        )));
    }
    let frames = frames as usize;
    let amplitude = config.amplitude.clamp(0.0, 1.0) * f32::from(i16::MAX);
    let step = TAU * config.frequency / config.sample_rate as f32;

    let signal: Vec<i16> = (0..frames)
        .map(|frame| {
            let phase = (step * frame as f32) % TAU;
            (phase.sin() * amplitude).round() as i16
        })
        .collect();

    Ok(vec![signal; usize::from(config.channels)])
}

/// Renders the configured tone and writes it as a 16 bit PCM wave file.
///
/// Returns the number of frames written.
pub fn write_tone<W: Write>(writer: W, config: &ToneConfig) -> Result<usize> {
    let channels = render_tone(config)?;
    let frames = channels.first().map_or(0, Vec::len);

    let mut writer = WaveWriter::new(writer);
    if config.extensible {
        let mask = ChannelMask::for_channel_count(config.channels);
        let format = WaveFormatExtensible::pcm(config.channels, config.sample_rate, 16, mask);
        writer.write_pcm16(&format, &channels)?;
    } else {
        let format = WaveFormatEx::pcm(config.channels, config.sample_rate, 16);
        writer.write_pcm16(&format, &channels)?;
    }
    writer.flush()?;

    tracing::info!(
        frames,
        channels = config.channels,
        sample_rate = config.sample_rate,
        frequency = config.frequency,
        "wrote tone"
    );
    Ok(frames)
}
