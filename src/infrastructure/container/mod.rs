//! Audio container serializers

mod hound_wav;

pub use hound_wav::HoundWavSerializer;
