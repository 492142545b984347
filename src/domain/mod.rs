//! Domain layer - Core audio logic
//!
//! Contains value objects, state machines, and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod error;
pub mod recording;

// Re-export common types
pub use audio::{AudioData, AudioMimeType, EncodedChunk, FrameChunker, SampleAccumulator};
pub use config::{AppConfig, EncoderConfig, EncoderKind};
pub use error::*;
pub use recording::{Duration, EncoderState, RecordingState};
