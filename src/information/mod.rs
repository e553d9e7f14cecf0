//! Information Module: Transition Matrices and Effective Information
//!
//! Implements the causal-strength measure compared across scales.
//!
//! ## Core Concepts
//!
//! ### Effective Information (EI)
//!
//! The mutual information between the state at t and at t+1 when the state
//! at t is set by a uniform (maximum-entropy) intervention:
//!
//!   EI = H(⟨T[i,:]⟩ᵢ) - ⟨H(T[i,:])⟩ᵢ
//!
//! ### Causal Emergence
//!
//! A coarse-grained description whose EI exceeds that of the micro
//! description: causal structure only visible at the higher level.
//!
//! ### Bias control
//!
//! - State-space-scaled smoothing (α = 1/n)
//! - Real observation counts carried with every matrix
//! - Sample-count equalization across scales

mod transition;
mod effective;

pub use transition::{estimate_transition_matrix, TransitionMatrix, TransitionSample};
pub use effective::{
    compute_ei_equalized, effective_information, shannon_entropy_bits, EqualizedEi,
    NEGATIVE_TOLERANCE,
};
