//! Input/output helpers.
//!
//! - measurement file ingest (`ingest`)
//! - histogram / sweep exports to CSV (`export`)
//! - report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
