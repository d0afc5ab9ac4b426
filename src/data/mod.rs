//! Synthetic decay data with a known lifetime.

pub mod sample;

pub use sample::*;
