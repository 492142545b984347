//! Audio domain module: sample conversion, framing and encoded output

mod audio_data;
mod chunk;
mod frame;
pub mod pcm;

pub use audio_data::{AudioData, AudioMimeType};
pub use chunk::{concat_chunks, EncodedChunk, SampleAccumulator};
pub use frame::{frame_count, FrameChunker, MP3_FRAME_SIZE};
