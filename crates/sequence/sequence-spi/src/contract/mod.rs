//! Contract definitions for the engine's external collaborators.

mod param_source;
mod sequence_source;

pub use param_source::ParamSource;
pub use sequence_source::{MetricQuery, SequenceSource};
