//! Microphone capture using cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread that
//! keeps it alive until capture is stopped. Callback data is mixed to mono
//! and forwarded block by block over an unbounded channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Duration as TokioDuration;

use super::mix_to_mono;
use crate::application::ports::{AudioSource, CaptureError, CaptureStream};

/// Poll interval of the stream-owning thread
const POLL_INTERVAL_MS: u64 = 50;

/// An input device as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub name: String,
    pub is_default: bool,
}

/// List the host's input devices
pub fn list_input_devices() -> Result<Vec<InputDevice>, CaptureError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

    Ok(devices
        .filter_map(|d| d.name().ok())
        .map(|name| InputDevice {
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
        })
        .collect())
}

/// Microphone source on the default (or a named) input device
pub struct CpalCapture {
    device_name: Option<String>,
    is_capturing: Arc<AtomicBool>,
}

impl CpalCapture {
    /// Capture from the default input device
    pub fn new() -> Self {
        Self {
            device_name: None,
            is_capturing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Capture from the input device with this exact name
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
            ..Self::new()
        }
    }

    fn find_device(name: Option<&str>) -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        match name {
            None => host.default_input_device().ok_or(CaptureError::NoAudioDevice),
            Some(wanted) => host
                .input_devices()
                .map_err(|e| CaptureError::StartFailed(e.to_string()))?
                .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                .ok_or_else(|| CaptureError::DeviceNotFound(wanted.to_string())),
        }
    }

    /// Build and start the input stream on the current thread
    fn open_stream(
        device_name: Option<&str>,
        is_capturing: Arc<AtomicBool>,
        blocks: mpsc::UnboundedSender<Vec<f32>>,
    ) -> Result<(cpal::Stream, u32), CaptureError> {
        let device = Self::find_device(device_name)?;
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::StartFailed(format!("Failed to get config: {}", e)))?;

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        tracing::debug!(
            device = %device.name().unwrap_or_default(),
            sample_rate,
            channels,
            format = ?sample_format,
            "opening input stream"
        );

        let on_error = |err: cpal::StreamError| tracing::error!(error = %err, "audio stream error");

        let stream = match sample_format {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if is_capturing.load(Ordering::SeqCst) {
                        let _ = blocks.send(mix_to_mono(data, channels));
                    }
                },
                on_error,
                None,
            ),
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if is_capturing.load(Ordering::SeqCst) {
                        let floats: Vec<f32> =
                            data.iter().map(|&s| f32::from(s) / 32768.0).collect();
                        let _ = blocks.send(mix_to_mono(&floats, channels));
                    }
                },
                on_error,
                None,
            ),
            other => {
                return Err(CaptureError::StartFailed(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        Ok((stream, sample_rate))
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSource for CpalCapture {
    async fn start(&self) -> Result<CaptureStream, CaptureError> {
        if self.is_capturing.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyCapturing);
        }

        let (block_tx, block_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let is_capturing = Arc::clone(&self.is_capturing);
        let device_name = self.device_name.clone();

        // The stream must stay on the thread that created it
        std::thread::spawn(move || {
            let opened =
                Self::open_stream(device_name.as_deref(), Arc::clone(&is_capturing), block_tx);
            let stream = match opened {
                Ok((stream, sample_rate)) => {
                    let _ = ready_tx.send(Ok(sample_rate));
                    stream
                }
                Err(e) => {
                    is_capturing.store(false, Ordering::SeqCst);
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            while is_capturing.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS));
            }

            // Dropping the stream drops the sender and ends the block stream
            drop(stream);
            tracing::debug!("input stream closed");
        });

        let sample_rate = ready_rx
            .await
            .map_err(|_| CaptureError::StartFailed("capture thread exited".into()))??;

        Ok(CaptureStream {
            sample_rate,
            blocks: block_rx,
        })
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        if !self.is_capturing.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::CaptureFailed("No capture in progress".into()));
        }

        // Give the thread a moment to release the device
        tokio::time::sleep(TokioDuration::from_millis(POLL_INTERVAL_MS * 2)).await;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.is_capturing.load(Ordering::SeqCst)
    }
}
