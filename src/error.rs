//! Error types for the early-warning pipeline.

use thiserror::Error;

/// Errors raised by simulators, encoders and the EI engine.
///
/// Lack of data is never an error: sparse or degenerate transition
/// statistics produce an effective information of `0.0`.
#[derive(Debug, Error)]
pub enum EwsError {
    /// A parameter is out of its valid domain (non-positive size, patch
    /// not dividing the grid, too many oscillator triplets, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two sequences that must be paired have different lengths.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A state index lies outside `[0, n_states)`.
    #[error("State {state} out of range for {n_states} states")]
    StateOutOfRange { state: usize, n_states: usize },

    /// EI came out meaningfully negative: entropy or normalization is broken.
    #[error("Effective information is negative ({0:e} bits)")]
    NegativeEffectiveInformation(f64),
}

/// Result type alias for early-warning operations.
pub type Result<T> = std::result::Result<T, EwsError>;

/// Shorthand for building an [`EwsError::InvalidConfig`].
pub(crate) fn invalid(msg: impl Into<String>) -> EwsError {
    EwsError::InvalidConfig(msg.into())
}
