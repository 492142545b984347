//! Audio container serialization port

use thiserror::Error;

/// Container serialization errors
#[derive(Debug, Clone, Error)]
pub enum SerializationError {
    #[error("Failed to create container: {0}")]
    Header(String),

    #[error("Failed to write samples: {0}")]
    Write(String),

    #[error("Failed to finalize container: {0}")]
    Finalize(String),
}

/// Port for wrapping mono float samples in a container format
pub trait ContainerSerializer: Send + Sync {
    /// Serialize `samples` with `sample_rate` metadata into container bytes
    fn serialize(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, SerializationError>;
}
