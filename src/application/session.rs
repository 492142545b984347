//! Recording session: owns the encoder for one recording at a time

use crate::domain::audio::{AudioData, AudioMimeType, EncodedChunk};
use crate::domain::config::EncoderConfig;
use crate::domain::recording::{Duration, EncoderState, RecordingState};

use super::encoder::{new_encoder, EncoderAdapter, EncoderBackends, EncoderError};

/// Finished recording: ordered chunks plus their MIME tag
#[derive(Debug, Clone)]
pub struct RecordingOutput {
    pub chunks: Vec<EncodedChunk>,
    pub mime_type: AudioMimeType,
}

impl RecordingOutput {
    /// Total payload size
    pub fn total_bytes(&self) -> usize {
        self.chunks.iter().map(EncodedChunk::len).sum()
    }

    /// Join the chunks into one audio payload
    pub fn into_audio_data(self) -> AudioData {
        AudioData::from_chunks(&self.chunks, self.mime_type)
    }
}

/// Recording session entity.
///
/// State machine:
///   IDLE | STOPPED -> RECORDING (start)
///   RECORDING -> STOPPED (stop)
///   RECORDING | STOPPED -> STOPPED (finish)
///
/// `stop` only marks the end of capture; encoding is finalized by `finish`.
pub struct RecordingSession {
    backends: EncoderBackends,
    warmup: Duration,
    state: RecordingState,
    adapter: Option<EncoderAdapter>,
    warmup_remaining: usize,
    samples_received: u64,
}

impl RecordingSession {
    /// Create an idle session
    pub fn new(backends: EncoderBackends) -> Self {
        Self {
            backends,
            warmup: Duration::ZERO,
            state: RecordingState::Idle,
            adapter: None,
            warmup_remaining: 0,
            samples_received: 0,
        }
    }

    /// Discard whole blocks until `warmup` worth of capture has passed
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Begin a recording with a new adapter selected by `config.kind()`.
    ///
    /// Starting from `Stopped` replaces the previous adapter; output that was
    /// never collected with `finish` is dropped.
    pub fn start(&mut self, config: EncoderConfig, capture_rate: u32) -> Result<(), EncoderError> {
        if self.state.is_recording() {
            return Err(self.state.reject("start recording").into());
        }

        let adapter = new_encoder(&config, capture_rate, &self.backends)?;
        if let Some(previous) = self.adapter.replace(adapter) {
            if previous.state() != EncoderState::Finished {
                tracing::warn!(
                    samples = self.samples_received,
                    "previous recording was never finished, discarding its output"
                );
            }
        }
        self.warmup_remaining = self.warmup.samples_at(capture_rate);
        self.samples_received = 0;
        self.state = RecordingState::Recording;

        tracing::info!(
            kind = %config.kind(),
            sample_rate = config.sample_rate(),
            capture_rate,
            warmup_ms = self.warmup.as_millis(),
            "recording started"
        );
        Ok(())
    }

    /// Forward one captured block to the adapter
    pub fn encode(&mut self, block: &[f32]) -> Result<(), EncoderError> {
        if !self.admit(block.len())? {
            return Ok(());
        }

        let adapter = self
            .adapter
            .as_mut()
            .ok_or_else(|| EncoderError::from(self.state.reject("encode")))?;
        adapter.encode(block)?;
        self.samples_received += block.len() as u64;
        Ok(())
    }

    /// Like [`encode`](Self::encode), but runs the adapter on a blocking
    /// task. Use this from async code: the MP3 codec writes to a pipe.
    pub async fn encode_blocking(&mut self, block: Vec<f32>) -> Result<(), EncoderError> {
        if !self.admit(block.len())? {
            return Ok(());
        }

        let mut adapter = self
            .adapter
            .take()
            .ok_or_else(|| EncoderError::from(self.state.reject("encode")))?;
        let len = block.len() as u64;

        let join = tokio::task::spawn_blocking(move || {
            let result = adapter.encode(&block);
            (adapter, result)
        })
        .await;

        match join {
            Ok((adapter, result)) => {
                self.adapter = Some(adapter);
                result?;
            }
            Err(e) => return Err(EncoderError::TaskFailed(e.to_string())),
        }
        self.samples_received += len;
        Ok(())
    }

    /// Check the state and consume warm-up. `false` means the block is
    /// discarded.
    fn admit(&mut self, len: usize) -> Result<bool, EncoderError> {
        if !self.state.is_recording() {
            return Err(self.state.reject("encode").into());
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining = self.warmup_remaining.saturating_sub(len);
            return Ok(false);
        }
        Ok(true)
    }

    /// Mark the end of capture without finalizing the encoder
    pub fn stop(&mut self) -> Result<(), EncoderError> {
        if !self.state.is_recording() {
            return Err(self.state.reject("stop recording").into());
        }
        self.state = RecordingState::Stopped;
        tracing::info!(samples = self.samples_received, "recording stopped");
        Ok(())
    }

    /// Finalize the encoder and return the ordered chunks.
    ///
    /// Finalization runs on a blocking task; it cannot be cancelled once
    /// started.
    pub async fn finish(&mut self) -> Result<RecordingOutput, EncoderError> {
        let mut adapter = match (self.state, self.adapter.take()) {
            (RecordingState::Recording | RecordingState::Stopped, Some(adapter)) => adapter,
            (_, adapter) => {
                self.adapter = adapter;
                return Err(self.state.reject("finish").into());
            }
        };
        self.state = RecordingState::Stopped;

        let mime_type = adapter.mime_type();
        let join = tokio::task::spawn_blocking(move || {
            let result = adapter.finish();
            (adapter, result)
        })
        .await;

        let chunks = match join {
            Ok((adapter, result)) => {
                self.adapter = Some(adapter);
                result?
            }
            Err(e) => return Err(EncoderError::TaskFailed(e.to_string())),
        };

        let output = RecordingOutput { chunks, mime_type };
        if output.total_bytes() == 0 {
            return Err(EncoderError::EmptyResult);
        }

        tracing::info!(
            mime_type = %output.mime_type,
            chunks = output.chunks.len(),
            bytes = output.total_bytes(),
            "recording finished"
        );
        Ok(output)
    }

    /// Drop the adapter's buffered data. Always succeeds.
    pub fn clear_buffer(&mut self) {
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.clear_buffer();
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// State of the current adapter, if a recording was started
    pub fn encoder_state(&self) -> Option<EncoderState> {
        self.adapter.as_ref().map(EncoderAdapter::state)
    }

    /// Samples forwarded to the adapter in the current recording
    pub fn samples_received(&self) -> u64 {
        self.samples_received
    }
}
