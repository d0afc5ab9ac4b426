//! Plotting helpers for terminal output.

pub mod ascii;

pub use ascii::*;
