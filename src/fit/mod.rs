//! Estimation engine.
//!
//! Responsibilities:
//!
//! - bin decay times into a fixed-width histogram
//! - map τ values onto the sweep grid
//! - evaluate lnL and χ² at every grid step (parallel, once per dataset)
//! - locate the optimum of either objective (scan or hill-climb)

pub mod histogram;
pub mod peak;
pub mod sweep;
pub mod tau_grid;

pub use histogram::*;
pub use peak::*;
pub use sweep::*;
pub use tau_grid::*;
