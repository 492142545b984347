//! Audio capture port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Failed to read audio file: {0}")]
    ReadFailed(String),

    #[error("No audio device available")]
    NoAudioDevice,

    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    #[error("Capture already in progress")]
    AlreadyCapturing,
}

/// A running capture: its sample rate and the stream of mono float blocks.
/// The stream ends when the source is stopped or exhausted.
#[derive(Debug)]
pub struct CaptureStream {
    pub sample_rate: u32,
    pub blocks: mpsc::UnboundedReceiver<Vec<f32>>,
}

/// Port for a source of mono float sample blocks
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Start delivering blocks.
    ///
    /// # Returns
    /// The capture rate and block receiver, or an error
    async fn start(&self) -> Result<CaptureStream, CaptureError>;

    /// Stop delivering blocks and release the device.
    async fn stop(&self) -> Result<(), CaptureError>;

    /// Check if currently capturing
    fn is_capturing(&self) -> bool;
}
