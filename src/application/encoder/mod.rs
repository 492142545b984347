//! Encoder adapters: the MP3 and WAV pipelines behind one interface
//!
//! Both variants accept raw float blocks through `encode`, produce the
//! complete payload from `finish`, and drop their output on `clear_buffer`.
//! The set of variants is closed, so they live in an enum rather than
//! behind a trait object.

mod mp3;
mod wav;

pub use mp3::Mp3Adapter;
pub use wav::WavAdapter;

use std::sync::Arc;

use thiserror::Error;

use super::ports::{
    CodecError, CodecFactory, ContainerSerializer, ResampleError, Resampler, SerializationError,
};
use crate::domain::audio::{AudioMimeType, EncodedChunk};
use crate::domain::config::{EncoderConfig, EncoderKind};
use crate::domain::error::{ConfigError, StateError};
use crate::domain::recording::EncoderState;

/// Errors from the encoding pipeline
#[derive(Debug, Clone, Error)]
pub enum EncoderError {
    #[error("Invalid encoder configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("No buffer to send: the encoder produced no output")]
    EmptyResult,

    #[error("Resampling failed: {0}")]
    Resample(#[from] ResampleError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Codec failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Finalization task failed: {0}")]
    TaskFailed(String),
}

/// The collaborators an adapter needs, shared across recordings
#[derive(Clone)]
pub struct EncoderBackends {
    pub codecs: Arc<dyn CodecFactory>,
    pub resampler: Arc<dyn Resampler>,
    pub serializer: Arc<dyn ContainerSerializer>,
}

impl EncoderBackends {
    pub fn new(
        codecs: Arc<dyn CodecFactory>,
        resampler: Arc<dyn Resampler>,
        serializer: Arc<dyn ContainerSerializer>,
    ) -> Self {
        Self {
            codecs,
            resampler,
            serializer,
        }
    }
}

/// One encoder instance, exclusively owned by a recording
pub enum EncoderAdapter {
    Mp3(Mp3Adapter),
    Wav(WavAdapter),
}

impl EncoderAdapter {
    /// Feed one block of float samples
    pub fn encode(&mut self, block: &[f32]) -> Result<(), EncoderError> {
        match self {
            Self::Mp3(adapter) => adapter.encode(block),
            Self::Wav(adapter) => adapter.encode(block),
        }
    }

    /// Finalize and return the ordered encoded chunks
    pub fn finish(&mut self) -> Result<Vec<EncodedChunk>, EncoderError> {
        match self {
            Self::Mp3(adapter) => adapter.finish(),
            Self::Wav(adapter) => adapter.finish(),
        }
    }

    /// Drop buffered input and produced output
    pub fn clear_buffer(&mut self) {
        match self {
            Self::Mp3(adapter) => adapter.clear_buffer(),
            Self::Wav(adapter) => adapter.clear_buffer(),
        }
    }

    pub fn state(&self) -> EncoderState {
        match self {
            Self::Mp3(adapter) => adapter.state(),
            Self::Wav(adapter) => adapter.state(),
        }
    }

    pub fn kind(&self) -> EncoderKind {
        match self {
            Self::Mp3(_) => EncoderKind::Mp3,
            Self::Wav(_) => EncoderKind::Wav,
        }
    }

    pub fn mime_type(&self) -> AudioMimeType {
        self.kind().mime_type()
    }
}

/// Construct the adapter selected by `config.kind()`.
///
/// `capture_rate` is the rate of the blocks that will be fed to `encode`.
/// MP3 cannot resample, so it requires `config.sample_rate() == capture_rate`.
pub fn new_encoder(
    config: &EncoderConfig,
    capture_rate: u32,
    backends: &EncoderBackends,
) -> Result<EncoderAdapter, EncoderError> {
    if capture_rate == 0 {
        return Err(ConfigError::InvalidSampleRate(capture_rate).into());
    }

    let adapter = match config.kind() {
        EncoderKind::Mp3 => {
            if config.sample_rate() != capture_rate {
                return Err(ConfigError::SampleRateMismatch {
                    configured: config.sample_rate(),
                    capture: capture_rate,
                }
                .into());
            }
            let codec = backends
                .codecs
                .create(config.sample_rate(), config.bit_rate())?;
            EncoderAdapter::Mp3(Mp3Adapter::new(*config, codec))
        }
        EncoderKind::Wav => EncoderAdapter::Wav(WavAdapter::new(
            *config,
            capture_rate,
            Arc::clone(&backends.resampler),
            Arc::clone(&backends.serializer),
        )),
    };

    tracing::debug!(
        kind = %config.kind(),
        sample_rate = config.sample_rate(),
        capture_rate,
        "encoder created"
    );
    Ok(adapter)
}
