//! Error types for sequence handling.

mod sequence_error;

pub use sequence_error::{Result, SequenceError};
