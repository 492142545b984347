//! WAV file source using hound
//!
//! Replays a WAV file as a stream of mono float blocks, the same shape
//! microphone capture produces.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hound::{SampleFormat, WavReader};
use tokio::sync::mpsc;

use super::mix_to_mono;
use crate::application::ports::{AudioSource, CaptureError, CaptureStream};

/// Mono samples per emitted block
pub const BLOCK_SIZE: usize = 4096;

/// Decoded file contents
struct DecodedWav {
    sample_rate: u32,
    samples: Vec<f32>,
}

/// Audio source reading a WAV file from disk
pub struct WavFileSource {
    path: PathBuf,
    is_capturing: Arc<AtomicBool>,
}

impl WavFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_capturing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file as mono floats in [-1.0, 1.0]
    fn decode(path: &Path) -> Result<DecodedWav, CaptureError> {
        let mut reader = WavReader::open(path)
            .map_err(|e| CaptureError::ReadFailed(format!("{}: {}", path.display(), e)))?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| CaptureError::ReadFailed(e.to_string()))?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| CaptureError::ReadFailed(e.to_string()))?
            }
        };

        tracing::debug!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.bits_per_sample,
            "decoded wav input"
        );

        Ok(DecodedWav {
            sample_rate: spec.sample_rate,
            samples: mix_to_mono(&interleaved, spec.channels),
        })
    }
}

#[async_trait]
impl AudioSource for WavFileSource {
    async fn start(&self) -> Result<CaptureStream, CaptureError> {
        if self.is_capturing.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyCapturing);
        }

        let path = self.path.clone();
        let decoded = tokio::task::spawn_blocking(move || Self::decode(&path))
            .await
            .map_err(|e| CaptureError::ReadFailed(format!("Decode task error: {}", e)))
            .and_then(|r| r);

        let decoded = match decoded {
            Ok(d) => d,
            Err(e) => {
                self.is_capturing.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let (tx, blocks) = mpsc::unbounded_channel();
        for block in decoded.samples.chunks(BLOCK_SIZE) {
            // Receiver gone means nobody is listening any more
            if tx.send(block.to_vec()).is_err() {
                break;
            }
        }

        Ok(CaptureStream {
            sample_rate: decoded.sample_rate,
            blocks,
        })
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        self.is_capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.is_capturing.load(Ordering::SeqCst)
    }
}
