//! Sample-rate conversion adapters

mod rubato;

pub use self::rubato::RubatoResampler;
