//! Analysis Module: Cross-Scale Early-Warning Statistics
//!
//! Turns per-point EI values and scalar indicators from a parameter sweep
//! into an early-warning verdict:
//!
//! - **Indicators**: variance and lag-1 autocorrelation of the order
//!   parameter series
//! - **Rank correlation**: Kendall's tau between the EI-ratio curve and the
//!   standard indicators
//! - **Triggers**: first crossing of μ₀ + 2σ₀ of a baseline stretch, and a
//!   sequential CUSUM alternative
//! - **Lead time**: signed distance from trigger to the known critical point
//! - **Causal emergence**: sweep points where EI(macro) > EI(micro)
//!
//! ## Key Result
//!
//! For an informative indicator:
//!
//!   lead time > 0
//!
//! i.e. the warning fires before the sweep reaches the transition.

mod indicators;
mod kendall;
mod threshold;
mod cusum;
mod emergence;

pub use indicators::{lag1_autocorrelation, mean, variance, SeriesIndicators};
pub use kendall::{kendall_tau, KendallTau};
pub use threshold::{
    find_trigger, lead_time, BaselineRange, BaselineThreshold, SweepDirection, Trigger,
    DEFAULT_N_SIGMA,
};
pub use cusum::{cusum_trigger, CusumDetector, CusumParams};
pub use emergence::{causal_emergence_events, ei_ratio, CausalEmergence, EmergenceEvent, EI_FLOOR};
