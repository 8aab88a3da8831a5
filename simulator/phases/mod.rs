//! Multi-phase simulator module
//!
//! Runs one source -> destination transfer per network size and collects the
//! per-phase statistics consumed by charting tools:
//! - wall-clock time of each transfer
//! - simulated propagation time
//! - remaining energy of the visited intermediate nodes

pub mod config;
pub mod runner;
pub mod stats;

pub use config::{OutputConfig, PhaseSimConfig};
pub use runner::PhaseRunner;
pub use stats::{PhaseSeriesResult, PhaseSummaryRow};
