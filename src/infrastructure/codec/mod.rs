//! MP3 frame codec adapters

mod ffmpeg_mp3;

pub use ffmpeg_mp3::{FfmpegCodecFactory, FfmpegMp3Codec};
