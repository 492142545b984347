//! Configuration domain module

mod app_config;
mod encoder_config;

pub use app_config::AppConfig;
pub use encoder_config::{EncoderConfig, EncoderKind, DEFAULT_BIT_RATE, DEFAULT_SAMPLE_RATE};
