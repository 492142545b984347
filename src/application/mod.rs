//! Application layer - Encoding pipeline and port interfaces
//!
//! Contains the encoder adapters, the recording session that drives them,
//! and the trait definitions for capture, codec and storage backends.

pub mod encoder;
pub mod ports;
pub mod session;

// Re-export the pipeline entry points
pub use encoder::{new_encoder, EncoderAdapter, EncoderBackends, EncoderError, Mp3Adapter, WavAdapter};
pub use session::{RecordingOutput, RecordingSession};
