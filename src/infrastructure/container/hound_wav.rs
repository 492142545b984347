//! In-memory WAV serializer using hound

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::application::ports::{ContainerSerializer, SerializationError};
use crate::domain::audio::pcm;

/// Bits per sample of the written container
const BITS_PER_SAMPLE: u16 = 16;

/// Writes mono 16-bit PCM RIFF/WAVE into a byte buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct HoundWavSerializer;

impl HoundWavSerializer {
    pub fn new() -> Self {
        Self
    }

    fn spec(sample_rate: u32) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        }
    }
}

impl ContainerSerializer for HoundWavSerializer {
    fn serialize(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, SerializationError> {
        let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));

        {
            let mut writer = WavWriter::new(&mut cursor, Self::spec(sample_rate))
                .map_err(|e| SerializationError::Header(e.to_string()))?;

            for sample in pcm::convert(samples) {
                writer
                    .write_sample(sample)
                    .map_err(|e| SerializationError::Write(e.to_string()))?;
            }

            writer
                .finalize()
                .map_err(|e| SerializationError::Finalize(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_back(bytes: &[u8]) -> (WavSpec, Vec<i16>) {
        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        let samples = reader.samples::<i16>().map(Result::unwrap).collect();
        (spec, samples)
    }

    #[test]
    fn writes_riff_header() {
        let serializer = HoundWavSerializer::new();
        let header = serializer.serialize(&[], 16000).unwrap().len();
        let bytes = serializer.serialize(&[0.0; 10], 16000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), header + 20);
    }

    #[test]
    fn header_describes_mono_16_bit() {
        let bytes = HoundWavSerializer::new().serialize(&[0.1; 4], 22050).unwrap();
        let (spec, samples) = read_back(&bytes);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, SampleFormat::Int);
        assert_eq!(samples.len(), 4);
    }

    #[test]
    fn samples_use_pcm_conversion() {
        let input = [1.0, -1.0, 0.0, 0.5, 2.0];
        let bytes = HoundWavSerializer::new().serialize(&input, 8000).unwrap();
        let (_, samples) = read_back(&bytes);
        assert_eq!(samples, vec![32767, -32768, 0, 16383, 32767]);
    }

    #[test]
    fn empty_input_is_header_only() {
        let bytes = HoundWavSerializer::new().serialize(&[], 44100).unwrap();
        assert!(!bytes.is_empty());
        let (spec, samples) = read_back(&bytes);
        assert_eq!(spec.sample_rate, 44100);
        assert!(samples.is_empty());
    }
}
