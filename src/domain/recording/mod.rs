//! Recording domain module

mod duration;
mod state;

pub use duration::{Duration, DEFAULT_WARMUP_MS};
pub use state::{EncoderState, RecordingState};
