use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wavefmt_core::{AppConfig, ParsedFormat, WaveError, WaveInfo};

fn main() -> wavefmt_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input, json } => run_inspect(&input, json),
        Commands::Tone {
            output,
            config,
            overrides,
        } => run_tone(&output, config.as_deref(), overrides),
    }
}

fn run_inspect(input: &Path, json: bool) -> wavefmt_core::Result<()> {
    tracing::info!(?input, "inspecting wave file");

    let mut reader = BufReader::new(File::open(input)?);
    let info = WaveInfo::read(&mut reader)?;

    if json {
        let rendered = serde_json::to_string_pretty(&info)
            .map_err(|err| WaveError::msg(format!("failed to render JSON: {err}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let format = info.format.wave_format();
    println!("file:               {}", input.display());
    println!("riff length:        {}", info.riff_length);
    println!("fmt chunk length:   {}", info.format_chunk_length);
    println!("format:             {}", format.tag());
    println!("channels:           {}", format.channel_count);
    println!("sample rate:        {} Hz", format.samples_per_second);
    println!("bytes per second:   {}", format.average_bytes_per_second);
    println!("block alignment:    {}", format.block_alignment);
    if let Some(bits) = info.format.bits_per_sample() {
        println!("bits per sample:    {bits}");
    }
    if let ParsedFormat::Extensible(extensible) = &info.format {
        println!("valid bits:         {}", extensible.valid_bits_per_sample);
        println!("channel mask:       {}", extensible.channel_mask);
        println!(
            "sub-format:         {} ({})",
            extensible.sub_format,
            extensible.sub_format_name().unwrap_or("unknown")
        );
    }
    println!(
        "data:               {} bytes at offset {}",
        info.data_size, info.data_offset
    );
    println!("frames:             {}", info.frame_count());
    println!("duration:           {:.3} s", info.duration_seconds());
    Ok(())
}

fn run_tone(
    output: &Path,
    config: Option<&Path>,
    overrides: ToneArgs,
) -> wavefmt_core::Result<()> {
    let mut config = match config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    overrides.apply(&mut config);

    tracing::info!(?output, tone = ?config.tone, "writing test tone");
    let writer = BufWriter::new(File::create(output)?);
    wavefmt_core::write_tone(writer, &config.tone)?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and write RIFF WAVE files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the format and data layout of a wave file.
    Inspect {
        /// Path to the wave file.
        input: PathBuf,
        /// Emit the parsed layout as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Write a sine test tone as a 16 bit PCM wave file.
    Tone {
        /// Output path for the generated wave file.
        output: PathBuf,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: ToneArgs,
    },
}

/// Command line values that take precedence over the configuration file.
#[derive(clap::Args, Debug, Default)]
struct ToneArgs {
    /// Frequency of the tone in Hz.
    #[arg(short, long)]
    frequency: Option<f32>,
    /// Length of the tone in seconds.
    #[arg(short, long)]
    seconds: Option<f32>,
    #[arg(long)]
    sample_rate: Option<u32>,
    #[arg(long)]
    channels: Option<u16>,
    /// Write an extensible format chunk.
    #[arg(long)]
    extensible: bool,
}

impl ToneArgs {
    fn apply(self, config: &mut AppConfig) {
        let tone = &mut config.tone;
        if let Some(frequency) = self.frequency {
            tone.frequency = frequency;
        }
        if let Some(seconds) = self.seconds {
            tone.seconds = seconds;
        }
        if let Some(sample_rate) = self.sample_rate {
            tone.sample_rate = sample_rate;
        }
        if let Some(channels) = self.channels {
            tone.channels = channels;
        }
        tone.extensible |= self.extensible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_configuration() {
        let mut config = AppConfig::default();
        ToneArgs {
            frequency: Some(1000.0),
            channels: Some(1),
            extensible: true,
            ..ToneArgs::default()
        }
        .apply(&mut config);

        assert_eq!(config.tone.frequency, 1000.0);
        assert_eq!(config.tone.channels, 1);
        assert_eq!(config.tone.seconds, 1.0);
        assert!(config.tone.extensible);
    }

    #[test]
    fn parses_tone_command() {
        let cli = Cli::parse_from([
            "wavefmt",
            "tone",
            "out.wav",
            "--frequency",
            "220",
            "--extensible",
        ]);
        let Commands::Tone {
            output,
            config,
            overrides,
        } = cli.command
        else {
            panic!("expected the tone command");
        };
        assert_eq!(output, PathBuf::from("out.wav"));
        assert!(config.is_none());
        assert_eq!(overrides.frequency, Some(220.0));
        assert!(overrides.extensible);
    }
}
