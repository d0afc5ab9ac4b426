//! `muon-lifetime` library crate.
//!
//! The binary (`muon`) is a thin wrapper around this library so that:
//!
//! - the estimation core is testable without spawning processes
//! - the TUI and the batch commands share one pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod session;
pub mod tui;
