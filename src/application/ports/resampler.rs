//! Sample-rate conversion port

use thiserror::Error;

/// Resampling errors
#[derive(Debug, Clone, Error)]
pub enum ResampleError {
    #[error("Resampler init failed: {0}")]
    Init(String),

    #[error("Resampling failed: {0}")]
    Process(String),
}

/// Port for converting mono float audio between sample rates
pub trait Resampler: Send + Sync {
    /// Resample `samples` captured at `from_rate` Hz to `to_rate` Hz
    fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32)
        -> Result<Vec<f32>, ResampleError>;
}
