//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the encoding pipeline
//! and the infrastructure adapters that capture, encode and store audio.

pub mod capture;
pub mod codec;
pub mod config;
pub mod resampler;
pub mod serializer;

// Re-export common types
pub use capture::{AudioSource, CaptureError, CaptureStream};
pub use codec::{CodecError, CodecFactory, FrameCodec};
pub use config::ConfigStore;
pub use resampler::{ResampleError, Resampler};
pub use serializer::{ContainerSerializer, SerializationError};
