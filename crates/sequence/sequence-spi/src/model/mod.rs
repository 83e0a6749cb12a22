//! Data models shared by all engine crates.

mod sequence;

pub use sequence::{Labels, Sequence};
