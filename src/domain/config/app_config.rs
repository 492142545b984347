//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::encoder_config::{EncoderConfig, EncoderKind, DEFAULT_BIT_RATE, DEFAULT_SAMPLE_RATE};
use crate::domain::error::ConfigError;
use crate::domain::recording::{Duration, DEFAULT_WARMUP_MS};

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub format: Option<String>,
    pub sample_rate: Option<u32>,
    pub bit_rate: Option<u32>,
    pub duration: Option<String>,
    pub start_recording_at_ms: Option<u64>,
    pub device: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            format: Some(EncoderKind::default().to_string()),
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            bit_rate: Some(DEFAULT_BIT_RATE),
            duration: None,
            start_recording_at_ms: Some(DEFAULT_WARMUP_MS),
            device: None,
            output_dir: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            format: other.format.or(self.format),
            sample_rate: other.sample_rate.or(self.sample_rate),
            bit_rate: other.bit_rate.or(self.bit_rate),
            duration: other.duration.or(self.duration),
            start_recording_at_ms: other.start_recording_at_ms.or(self.start_recording_at_ms),
            device: other.device.or(self.device),
            output_dir: other.output_dir.or(self.output_dir),
        }
    }

    /// Parse the selected encoder kind, defaulting to MP3 when unset
    pub fn encoder_kind(&self) -> Result<EncoderKind, ConfigError> {
        self.format
            .as_deref()
            .map_or(Ok(EncoderKind::default()), |s| s.parse())
    }

    /// Build the validated encoder configuration
    pub fn encoder_config(&self) -> Result<EncoderConfig, ConfigError> {
        EncoderConfig::new(
            self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE),
            self.bit_rate.unwrap_or(DEFAULT_BIT_RATE),
            self.encoder_kind()?,
        )
    }

    /// Parse the recording limit; None means record until interrupted
    pub fn duration_limit(&self) -> Result<Option<Duration>, ConfigError> {
        self.duration
            .as_deref()
            .map(|s| {
                s.parse::<Duration>()
                    .map_err(|e| ConfigError::ValidationError {
                        key: "duration".to_string(),
                        message: e.to_string(),
                    })
            })
            .transpose()
    }

    /// Get the warm-up window, or the 300 ms default if not set
    pub fn warmup_or_default(&self) -> Duration {
        Duration::from_millis(self.start_recording_at_ms.unwrap_or(DEFAULT_WARMUP_MS))
    }

    /// Get the output directory, or the current directory if not set
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
