//! MP3 frame codec port interfaces

use thiserror::Error;

/// Frame codec errors
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("Encoder backend not found: {0}")]
    NotFound(String),

    #[error("Failed to start encoder: {0}")]
    StartFailed(String),

    #[error("Failed to encode frame: {0}")]
    EncodeFailed(String),

    #[error("Failed to flush encoder: {0}")]
    FlushFailed(String),

    #[error("Encoder was already flushed")]
    Closed,
}

/// Port for a streaming frame codec (one mono channel).
///
/// Frames are at most 1152 samples; the last frame of a block may be shorter.
/// A call may legally return no bytes while the codec buffers internally.
pub trait FrameCodec: Send {
    /// Encode one PCM frame and return whatever output is ready
    fn encode_frame(&mut self, frame: &[i16]) -> Result<Vec<u8>, CodecError>;

    /// Drain all buffered output. Called exactly once at the end of a stream.
    fn flush(&mut self) -> Result<Vec<u8>, CodecError>;
}

/// Port for constructing a fresh codec per recording
pub trait CodecFactory: Send + Sync {
    /// Create a codec for mono input at `sample_rate` Hz and `bit_rate` kbit/s
    fn create(&self, sample_rate: u32, bit_rate: u32) -> Result<Box<dyn FrameCodec>, CodecError>;
}

impl<F> CodecFactory for F
where
    F: Fn(u32, u32) -> Result<Box<dyn FrameCodec>, CodecError> + Send + Sync,
{
    fn create(&self, sample_rate: u32, bit_rate: u32) -> Result<Box<dyn FrameCodec>, CodecError> {
        self(sample_rate, bit_rate)
    }
}
