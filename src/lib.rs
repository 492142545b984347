//! mic-recorder - microphone capture encoded to MP3 or WAV
//!
//! This crate turns a stream of mono float sample blocks into a finished
//! audio payload. MP3 is encoded incrementally, frame by frame, as blocks
//! arrive; WAV is buffered, optionally resampled, and framed once at the end.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: PCM conversion, frame chunking, chunk accumulation, config and state machines
//! - **Application**: Encoder adapters, the recording session, and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, FFmpeg, hound, rubato, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
