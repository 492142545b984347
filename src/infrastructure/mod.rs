//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like cpal, FFmpeg and hound.

pub mod capture;
pub mod codec;
pub mod config;
pub mod container;
pub mod resampling;

use std::sync::Arc;

use crate::application::EncoderBackends;

// Re-export adapters
pub use capture::{list_input_devices, CpalCapture, InputDevice, WavFileSource};
pub use codec::{FfmpegCodecFactory, FfmpegMp3Codec};
pub use config::XdgConfigStore;
pub use container::HoundWavSerializer;
pub use resampling::RubatoResampler;

/// Production encoder backends: FFmpeg for MP3, rubato and hound for WAV
pub fn default_backends() -> EncoderBackends {
    EncoderBackends::new(
        Arc::new(FfmpegCodecFactory::new()),
        Arc::new(RubatoResampler::new()),
        Arc::new(HoundWavSerializer::new()),
    )
}
