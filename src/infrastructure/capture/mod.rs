//! Audio capture adapters

mod cpal_capture;
mod wav_file;

pub use cpal_capture::{list_input_devices, CpalCapture, InputDevice};
pub use wav_file::WavFileSource;

/// Average interleaved frames down to one channel
pub(crate) fn mix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
