//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::config::{AppConfig, EncoderKind};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "MIC_RECORDER_CONFIG";

/// mic-recorder - record the microphone to MP3 or WAV
#[derive(Parser, Debug)]
#[command(name = "mic-recorder")]
#[command(version)]
#[command(about = "Record audio from the microphone and encode it to MP3 or WAV")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub encoder: EncoderArgs,

    /// Recording duration (e.g., 10s, 1m, 2m30s); records until Ctrl+C if omitted
    #[arg(short = 'd', long, value_name = "TIME")]
    pub duration: Option<String>,

    /// Input device name (see `mic-recorder devices`)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Discard the first MS milliseconds of capture
    #[arg(long, value_name = "MS")]
    pub warmup_ms: Option<u64>,

    /// Output file (default: recording-<timestamp>.<ext> in the output dir)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(long, value_name = "PATH", env = CONFIG_ENV_VAR, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Encoder options shared by recording and conversion
#[derive(Args, Debug, Clone, Default)]
pub struct EncoderArgs {
    /// Output format
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// WAV output sample rate in Hz (MP3 follows the input rate)
    #[arg(short = 'r', long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// MP3 bit rate in kbit/s
    #[arg(short = 'b', long, value_name = "KBPS")]
    pub bit_rate: Option<u32>,
}

impl EncoderArgs {
    /// Encoder fields as a partial config for merging
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            format: self.format.map(|f| EncoderKind::from(f).to_string()),
            sample_rate: self.sample_rate,
            bit_rate: self.bit_rate,
            ..AppConfig::empty()
        }
    }
}

impl Cli {
    /// Command-line overrides for the record command
    pub fn record_config(&self) -> AppConfig {
        AppConfig {
            duration: self.duration.clone(),
            start_recording_at_ms: self.warmup_ms,
            device: self.device.clone(),
            ..self.encoder.to_config()
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode an existing WAV file instead of the microphone
    Convert {
        /// Input WAV file
        input: PathBuf,

        #[command(flatten)]
        encoder: EncoderArgs,

        /// Output file (default: input name with the new extension)
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List audio input devices
    Devices,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Format argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Mp3,
    Wav,
}

impl From<FormatArg> for EncoderKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mp3 => EncoderKind::Mp3,
            FormatArg::Wav => EncoderKind::Wav,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "format",
    "sample_rate",
    "bit_rate",
    "duration",
    "start_recording_at_ms",
    "device",
    "output_dir",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["mic-recorder"]);
        assert!(cli.duration.is_none());
        assert!(cli.encoder.format.is_none());
        assert!(cli.encoder.sample_rate.is_none());
        assert!(cli.output.is_none());
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_encoder_options() {
        let cli = Cli::parse_from(["mic-recorder", "-f", "wav", "-r", "16000", "-b", "64"]);
        assert_eq!(cli.encoder.format, Some(FormatArg::Wav));
        assert_eq!(cli.encoder.sample_rate, Some(16000));
        assert_eq!(cli.encoder.bit_rate, Some(64));
    }

    #[test]
    fn cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["mic-recorder", "-f", "ogg"]).is_err());
    }

    #[test]
    fn record_config_carries_overrides() {
        let cli = Cli::parse_from([
            "mic-recorder",
            "-d",
            "30s",
            "--warmup-ms",
            "0",
            "--device",
            "USB Mic",
            "-f",
            "mp3",
        ]);
        let config = cli.record_config();
        assert_eq!(config.duration, Some("30s".to_string()));
        assert_eq!(config.start_recording_at_ms, Some(0));
        assert_eq!(config.device, Some("USB Mic".to_string()));
        assert_eq!(config.format, Some("mp3".to_string()));
        assert!(config.sample_rate.is_none());
    }

    #[test]
    fn cli_parses_convert() {
        let cli = Cli::parse_from(["mic-recorder", "convert", "in.wav", "-f", "wav", "-o", "out.wav"]);
        match cli.command {
            Some(Commands::Convert {
                input,
                encoder,
                output,
            }) => {
                assert_eq!(input, PathBuf::from("in.wav"));
                assert_eq!(encoder.format, Some(FormatArg::Wav));
                assert_eq!(output, Some(PathBuf::from("out.wav")));
            }
            other => panic!("Expected Convert command, got {:?}", other),
        }
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["mic-recorder", "config", "set", "format", "wav"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "format");
            assert_eq!(value, "wav");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["mic-recorder", "devices", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("format"));
        assert!(is_valid_config_key("start_recording_at_ms"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }
}
