//! FFT resampler using rubato

use rubato::{FftFixedIn, Resampler as _};

use crate::application::ports::{ResampleError, Resampler};

/// Input chunk size handed to the FFT resampler
const CHUNK_SIZE: usize = 1024;

/// Sub-chunks per chunk
const SUB_CHUNKS: usize = 2;

/// Mono FFT resampler.
///
/// A fresh rubato instance is created per call since the rates are only
/// known at finalization time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RubatoResampler;

impl RubatoResampler {
    pub fn new() -> Self {
        Self
    }

    /// Expected output length for `input_len` samples
    fn output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
        let ratio = f64::from(to_rate) / f64::from(from_rate);
        (input_len as f64 * ratio).ceil() as usize
    }
}

impl Resampler for RubatoResampler {
    fn resample(
        &self,
        samples: &[f32],
        from_rate: u32,
        to_rate: u32,
    ) -> Result<Vec<f32>, ResampleError> {
        if from_rate == 0 || to_rate == 0 {
            return Err(ResampleError::Init(format!(
                "invalid rates {} -> {}",
                from_rate, to_rate
            )));
        }
        if from_rate == to_rate || samples.is_empty() {
            return Ok(samples.to_vec());
        }

        let output_len = Self::output_len(samples.len(), from_rate, to_rate);

        let mut resampler = FftFixedIn::<f32>::new(
            from_rate as usize,
            to_rate as usize,
            CHUNK_SIZE,
            SUB_CHUNKS,
            1,
        )
        .map_err(|e| ResampleError::Init(e.to_string()))?;

        // The FFT filter delays its output; feed silence past the end of the
        // input until the delayed tail has been produced
        let delay = resampler.output_delay();
        let wanted = delay + output_len;

        let mut output = Vec::with_capacity(wanted + CHUNK_SIZE);
        let mut input_pos = 0;

        while output.len() < wanted {
            let frames_needed = resampler.input_frames_next();
            let end_pos = (input_pos + frames_needed).min(samples.len());

            // Pad the last chunk with silence
            let mut chunk = samples[input_pos..end_pos].to_vec();
            chunk.resize(frames_needed, 0.0);
            let wave_in = vec![chunk];

            let resampled = resampler
                .process(&wave_in, None)
                .map_err(|e| ResampleError::Process(e.to_string()))?;

            if let Some(channel) = resampled.into_iter().next() {
                output.extend(channel);
            }
            input_pos = end_pos;
        }

        let mut output = output.split_off(delay.min(output.len()));
        output.truncate(output_len);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_copy() {
        let input = vec![0.1, -0.2, 0.3];
        let output = RubatoResampler::new().resample(&input, 16000, 16000).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn empty_input_stays_empty() {
        let output = RubatoResampler::new().resample(&[], 44100, 16000).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn downsample_length_follows_ratio() {
        let input = vec![0.0f32; 44100];
        let output = RubatoResampler::new().resample(&input, 44100, 16000).unwrap();
        assert!((15900..=16000).contains(&output.len()), "got {}", output.len());
    }

    #[test]
    fn upsample_length_follows_ratio() {
        let input = vec![0.0f32; 8000];
        let output = RubatoResampler::new().resample(&input, 8000, 16000).unwrap();
        assert!((15900..=16000).contains(&output.len()), "got {}", output.len());
    }

    #[test]
    fn silence_stays_silent() {
        let input = vec![0.0f32; 4800];
        let output = RubatoResampler::new().resample(&input, 48000, 16000).unwrap();
        assert!(output.iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn constant_signal_has_no_leading_silence() {
        let input = vec![0.5f32; 44100];
        let output = RubatoResampler::new().resample(&input, 44100, 16000).unwrap();
        assert_eq!(output.len(), 16000);

        let leading_quiet = output.iter().take_while(|s| s.abs() < 0.05).count();
        assert!(leading_quiet < 4, "{} leading near-zero samples", leading_quiet);
        assert!(output[100..15900].iter().all(|s| (s - 0.5).abs() < 0.02));
    }

    #[test]
    fn loud_tail_survives_resampling() {
        let mut input = vec![0.1f32; 44100];
        input[44100 - 4410..].fill(0.9);
        let output = RubatoResampler::new().resample(&input, 44100, 16000).unwrap();

        let loud = output.iter().filter(|s| **s > 0.8).count();
        assert!(loud >= 1570, "expected ~1600 loud samples, got {}", loud);
        assert!(output[15990] > 0.8);
    }

    #[test]
    fn zero_rate_is_init_error() {
        let result = RubatoResampler::new().resample(&[0.0; 4], 0, 16000);
        assert!(matches!(result, Err(ResampleError::Init(_))));
    }

    #[test]
    fn output_len_rounds_up() {
        assert_eq!(RubatoResampler::output_len(3, 3, 2), 2);
        assert_eq!(RubatoResampler::output_len(44100, 44100, 16000), 16000);
    }
}
