//! Exponential decay model.
//!
//! The model is a small, pure function so that the sweep, the session and the
//! renderers can all evaluate it the same way.

pub mod model;

pub use model::*;
