//! MP3 encoder adapter
//!
//! Each block is converted to 16-bit PCM, split into 1152-sample frames and
//! pushed through the frame codec as it arrives. Codec output accumulates in
//! arrival order; `finish` flushes the codec once and hands the chunks back.

use crate::application::ports::FrameCodec;
use crate::domain::audio::{pcm, EncodedChunk, FrameChunker, SampleAccumulator};
use crate::domain::config::EncoderConfig;
use crate::domain::recording::EncoderState;

use super::EncoderError;

/// Streaming MP3 adapter over a [`FrameCodec`]
pub struct Mp3Adapter {
    config: EncoderConfig,
    codec: Box<dyn FrameCodec>,
    accumulator: SampleAccumulator,
    state: EncoderState,
    frames_encoded: u64,
}

impl Mp3Adapter {
    /// Create an adapter around a freshly created codec
    pub fn new(config: EncoderConfig, codec: Box<dyn FrameCodec>) -> Self {
        Self {
            config,
            codec,
            accumulator: SampleAccumulator::new(),
            state: EncoderState::Idle,
            frames_encoded: 0,
        }
    }

    /// Encode one block of float samples frame by frame
    pub fn encode(&mut self, block: &[f32]) -> Result<(), EncoderError> {
        self.state.begin_encode()?;

        let samples = pcm::convert(block);
        for frame in FrameChunker::mp3(&samples) {
            let bytes = self.codec.encode_frame(frame)?;
            self.frames_encoded += 1;
            // An empty result means the codec is still buffering
            if !bytes.is_empty() {
                self.accumulator.append(EncodedChunk::new(bytes));
            }
        }
        Ok(())
    }

    /// Flush the codec and return every accumulated chunk.
    ///
    /// Fails with [`EncoderError::EmptyResult`] when nothing was produced and
    /// with a state error on a second call.
    pub fn finish(&mut self) -> Result<Vec<EncodedChunk>, EncoderError> {
        self.state.begin_finish()?;

        let tail = self.codec.flush()?;
        if !tail.is_empty() {
            self.accumulator.append(EncodedChunk::new(tail));
        }

        tracing::debug!(
            frames = self.frames_encoded,
            chunks = self.accumulator.len(),
            bytes = self.accumulator.total_bytes(),
            bit_rate = self.config.bit_rate(),
            "mp3 encoder finished"
        );

        if self.accumulator.total_bytes() == 0 {
            return Err(EncoderError::EmptyResult);
        }
        Ok(self.accumulator.snapshot().to_vec())
    }

    /// Empty the accumulator. The codec is not reset.
    pub fn clear_buffer(&mut self) {
        self.accumulator.clear();
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Number of frames handed to the codec so far
    pub fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }

    /// Chunks accumulated so far
    pub fn buffered(&self) -> &[EncodedChunk] {
        self.accumulator.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::super::testing::{recording_codec, CodecLog};
    use super::*;
    use crate::domain::audio::MP3_FRAME_SIZE;

    fn adapter(silent: bool, flush: Vec<u8>) -> (Mp3Adapter, Arc<Mutex<CodecLog>>) {
        let (codec, log) = recording_codec(silent, flush);
        let config = EncoderConfig::mp3(44100).unwrap();
        (Mp3Adapter::new(config, Box::new(codec)), log)
    }

    #[test]
    fn two_frame_block_encodes_exactly_twice() {
        let (mut mp3, log) = adapter(false, vec![0xAA]);
        mp3.encode(&vec![0.25; 2304]).unwrap();

        {
            let log = log.lock().unwrap();
            assert_eq!(log.frames.len(), 2);
            assert!(log.frames.iter().all(|f| f.len() == MP3_FRAME_SIZE));
        }

        let chunks = mp3.finish().unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().map(EncodedChunk::len).sum::<usize>() > 0);
        assert_eq!(log.lock().unwrap().flushes, 1);
    }

    #[test]
    fn partial_last_frame_is_encoded() {
        let (mut mp3, log) = adapter(false, vec![]);
        mp3.encode(&vec![0.0; 1153]).unwrap();

        let log = log.lock().unwrap();
        let lens: Vec<usize> = log.frames.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![1152, 1]);
        assert_eq!(mp3.frames_encoded(), 2);
    }

    #[test]
    fn frames_carry_converted_pcm() {
        let (mut mp3, log) = adapter(false, vec![]);
        mp3.encode(&[1.0, -1.0, 0.5]).unwrap();
        assert_eq!(log.lock().unwrap().frames[0], vec![32767, -32768, 16383]);
    }

    #[test]
    fn silent_frames_add_no_chunks() {
        let (mut mp3, _) = adapter(true, vec![1, 2, 3]);
        mp3.encode(&vec![0.1; 4000]).unwrap();
        assert!(mp3.buffered().is_empty());

        let chunks = mp3.finish().unwrap();
        assert_eq!(chunks, vec![EncodedChunk::new(vec![1, 2, 3])]);
    }

    #[test]
    fn chunks_keep_arrival_order() {
        let (mut mp3, _) = adapter(false, vec![0xFF]);
        mp3.encode(&[0.0; 4]).unwrap();
        mp3.encode(&[1.0; 2]).unwrap();

        let chunks = mp3.finish().unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].as_bytes(), &[0, 0, 0, 0]);
        assert_eq!(chunks[1].as_bytes(), &[0x7F, 0x7F]);
        assert_eq!(chunks[2].as_bytes(), &[0xFF]);
    }

    #[test]
    fn finish_without_encode_and_empty_flush_is_empty_result() {
        let (mut mp3, log) = adapter(false, vec![]);
        let result = mp3.finish();
        assert!(matches!(result, Err(EncoderError::EmptyResult)));
        assert_eq!(mp3.state(), EncoderState::Finished);
        assert_eq!(log.lock().unwrap().flushes, 1);
    }

    #[test]
    fn finish_twice_is_rejected_without_second_flush() {
        let (mut mp3, log) = adapter(false, vec![9]);
        mp3.encode(&[0.2; 8]).unwrap();
        mp3.finish().unwrap();

        let err = mp3.finish().unwrap_err();
        assert!(matches!(err, EncoderError::State(ref e) if e.action == "finish"));
        assert_eq!(log.lock().unwrap().flushes, 1);
    }

    #[test]
    fn encode_after_finish_is_state_error() {
        let (mut mp3, _) = adapter(false, vec![9]);
        mp3.finish().unwrap();
        mp3.clear_buffer();

        let err = mp3.encode(&[0.0; 4]).unwrap_err();
        assert!(matches!(err, EncoderError::State(ref e) if e.current_state == "finished"));
    }

    #[test]
    fn clear_buffer_is_idempotent() {
        let (mut mp3, _) = adapter(false, vec![]);
        mp3.encode(&[0.3; 100]).unwrap();
        assert_eq!(mp3.buffered().len(), 1);

        mp3.clear_buffer();
        assert!(mp3.buffered().is_empty());
        mp3.clear_buffer();
        assert!(mp3.buffered().is_empty());
    }

    #[test]
    fn empty_block_touches_nothing() {
        let (mut mp3, log) = adapter(false, vec![]);
        mp3.encode(&[]).unwrap();
        assert!(log.lock().unwrap().frames.is_empty());
        assert_eq!(mp3.state(), EncoderState::Encoding);
    }
}
