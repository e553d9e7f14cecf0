//! Coarse-Graining Module: From Configurations to Finite-State Sequences
//!
//! Turns simulator output into small-alphabet state sequences at two or
//! more scales:
//!
//! - **Micro**: p×p spin patches (2^(p²) states) or oscillator triplets
//!   (k³ states) read straight off the configuration
//! - **Macro**: the same encoding applied after b×b block majority vote
//!   (lattice) or group circular-mean phases (oscillators)
//!
//! Every encoder is deterministic; the only randomness is the one-time
//! choice of oscillator triplets, taken from a caller-supplied RNG.

mod patch;
mod lattice;
mod phases;

pub use patch::{PatchStates, MAX_STATES};
pub use lattice::{coarsegrain, coarsegrain_config, encode_patch, to_patch_states};
pub use phases::{coarsegrain_phases, order_parameter_states, phase_bin, PhaseEncoder};
