//! WAV encoder adapter
//!
//! WAV is framed once, at the end: blocks are concatenated, optionally
//! resampled from the capture rate, then serialized into a single chunk.

use std::sync::Arc;

use crate::application::ports::{ContainerSerializer, Resampler};
use crate::domain::audio::{EncodedChunk, SampleAccumulator};
use crate::domain::config::EncoderConfig;
use crate::domain::recording::EncoderState;

use super::EncoderError;

/// Buffering WAV adapter
pub struct WavAdapter {
    config: EncoderConfig,
    capture_rate: u32,
    resampler: Arc<dyn Resampler>,
    serializer: Arc<dyn ContainerSerializer>,
    samples: Vec<f32>,
    accumulator: SampleAccumulator,
    state: EncoderState,
}

impl WavAdapter {
    /// Create an adapter producing `config.sample_rate()` output from
    /// blocks captured at `capture_rate`
    pub fn new(
        config: EncoderConfig,
        capture_rate: u32,
        resampler: Arc<dyn Resampler>,
        serializer: Arc<dyn ContainerSerializer>,
    ) -> Self {
        Self {
            config,
            capture_rate,
            resampler,
            serializer,
            samples: Vec::new(),
            accumulator: SampleAccumulator::new(),
            state: EncoderState::Idle,
        }
    }

    /// Append a block to the running sample buffer
    pub fn encode(&mut self, block: &[f32]) -> Result<(), EncoderError> {
        self.state.begin_encode()?;
        self.samples.extend_from_slice(block);
        Ok(())
    }

    /// Resample if needed, serialize, and return the single container chunk.
    ///
    /// The buffered samples are consumed whether or not finalization succeeds.
    pub fn finish(&mut self) -> Result<Vec<EncodedChunk>, EncoderError> {
        self.state.begin_finish()?;

        let captured = std::mem::take(&mut self.samples);
        let target_rate = self.config.sample_rate();

        let samples = if self.needs_resampling() {
            tracing::debug!(
                from = self.capture_rate,
                to = target_rate,
                samples = captured.len(),
                "resampling before serialization"
            );
            self.resampler
                .resample(&captured, self.capture_rate, target_rate)?
        } else {
            captured
        };

        let bytes = self.serializer.serialize(&samples, target_rate)?;
        if bytes.is_empty() {
            return Err(EncoderError::EmptyResult);
        }

        tracing::debug!(
            samples = samples.len(),
            bytes = bytes.len(),
            sample_rate = target_rate,
            "wav encoder finished"
        );

        self.accumulator.append(EncodedChunk::new(bytes));
        Ok(self.accumulator.snapshot().to_vec())
    }

    /// Empty both the sample buffer and the produced chunk
    pub fn clear_buffer(&mut self) {
        self.samples = Vec::new();
        self.accumulator.clear();
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Whether `finish` will run the resampler
    pub fn needs_resampling(&self) -> bool {
        self.capture_rate != self.config.sample_rate()
    }

    /// Number of float samples currently buffered
    pub fn buffered_samples(&self) -> usize {
        self.samples.len()
    }
}
