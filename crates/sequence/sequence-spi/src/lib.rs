//! Sequence Service Provider Interface
//!
//! Defines the time series model shared by every engine crate and the
//! contracts of the external collaborators (time-series source, dynamic
//! parameter source).

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{MetricQuery, ParamSource, SequenceSource};
pub use error::{Result, SequenceError};
pub use model::{Labels, Sequence};
