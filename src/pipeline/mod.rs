//! Pipeline Module: Parameter Sweeps and the Early-Warning Report
//!
//! Sequential, per-point state machine:
//!
//! 1. Simulate at one control-parameter value (fresh seeded RNG)
//! 2. Encode micro patches and coarse-grained macro patches
//! 3. Estimate transition matrices and EI at every scale
//! 4. Record order-parameter mean, variance and lag-1 autocorrelation
//!
//! The aggregated [`SweepResults`] then feed [`EarlyWarningReport::analyze`].

mod config;
mod sweep;
mod report;

pub use config::{linspace_inclusive, IsingSweepConfig, KuramotoSweepConfig, MAX_GRID_POINTS};
pub use sweep::{run_ising_sweep, run_kuramoto_sweep, ScaleSeries, SweepResults, SystemKind};
pub use report::{AnalysisConfig, EarlyWarningReport, IndicatorWarning, ScaleReport};
