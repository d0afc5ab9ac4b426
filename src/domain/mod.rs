//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration (`AnalysisConfig`, `HistogramSpec`, `HillClimbOptions`)
//! - objective / search selectors (`Objective`, `PeakMode`)
//! - serializable outputs (`OptimizerResult`, `ModelCurve`, `ReportFile`, etc.)

pub mod types;

pub use types::*;
