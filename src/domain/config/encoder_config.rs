//! Encoder configuration value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::audio::AudioMimeType;
use crate::domain::error::ConfigError;

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default MP3 bit rate in kbit/s (128 or 160 is mid-range quality)
pub const DEFAULT_BIT_RATE: u32 = 128;

/// Output encoder selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    #[default]
    Mp3,
    Wav,
}

impl EncoderKind {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// MIME tag of the payload this encoder produces
    pub const fn mime_type(&self) -> AudioMimeType {
        match self {
            Self::Mp3 => AudioMimeType::Mp3,
            Self::Wav => AudioMimeType::Wav,
        }
    }

    /// Whether the encoder can convert from a different capture rate
    pub const fn supports_resampling(&self) -> bool {
        matches!(self, Self::Wav)
    }
}

impl FromStr for EncoderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            _ => Err(ConfigError::UnknownEncoderKind(s.to_string())),
        }
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated encoder configuration, fixed for the lifetime of an adapter.
///
/// For MP3 `sample_rate` must equal the capture rate. For WAV it is the
/// output rate and the capture is resampled when they differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    sample_rate: u32,
    bit_rate: u32,
    kind: EncoderKind,
}

impl EncoderConfig {
    /// Create a validated configuration
    pub fn new(sample_rate: u32, bit_rate: u32, kind: EncoderKind) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        if bit_rate == 0 {
            return Err(ConfigError::InvalidBitRate(bit_rate));
        }
        Ok(Self {
            sample_rate,
            bit_rate,
            kind,
        })
    }

    /// MP3 configuration with the default bit rate
    pub fn mp3(sample_rate: u32) -> Result<Self, ConfigError> {
        Self::new(sample_rate, DEFAULT_BIT_RATE, EncoderKind::Mp3)
    }

    /// WAV configuration producing `sample_rate` output
    pub fn wav(sample_rate: u32) -> Result<Self, ConfigError> {
        Self::new(sample_rate, DEFAULT_BIT_RATE, EncoderKind::Wav)
    }

    /// A copy of this configuration with another sample rate
    pub fn with_sample_rate(&self, sample_rate: u32) -> Result<Self, ConfigError> {
        Self::new(sample_rate, self.bit_rate, self.kind)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bit_rate(&self) -> u32 {
        self.bit_rate
    }

    pub fn kind(&self) -> EncoderKind {
        self.kind
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            bit_rate: DEFAULT_BIT_RATE,
            kind: EncoderKind::Mp3,
        }
    }
}
