//! Sequence Core
//!
//! Statistical primitives (rolling aggregation, double-rolling differences,
//! quantiles, linear fits), gap filling and interpolation, seasonal period
//! detection and classical decomposition, plus in-memory implementations of
//! the collaborator contracts.

pub mod decomposition;
pub mod params;
pub mod seasonality;
pub mod source;
pub mod stats;
pub mod tidy;

// Re-export SPI types for implementations
pub use sequence_spi::{
    Labels, MetricQuery, ParamSource, Result, Sequence, SequenceError, SequenceSource,
};

// Re-export main types
pub use decomposition::{decompose, Decomposition};
pub use params::StaticParams;
pub use seasonality::{detect_period, is_seasonal_series, SeasonalityConfig};
pub use source::MemorySource;
pub use stats::{linear_fit, Agg, DiffMode, LinearFitResult};
pub use tidy::{
    interpolate_linear, remove_spikes, sequence_interpolate, tidy_up, trim_head_and_tail_nan,
};
