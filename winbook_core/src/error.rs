//! Error types for the projection core.
//!
//! Only genuinely exceptional conditions become errors. Sparse market boards
//! yield `Option::None` and solver non-convergence is reported as a flag on
//! the result, per the failure semantics of those components.

use thiserror::Error;

/// Errors surfaced by the numeric core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A probability outside [0, 1] (or NaN) reached the distribution or
    /// edge calculator. These callers depend on precise contracts, so the
    /// value is rejected rather than clamped.
    #[error("invalid probability: {value} (must be finite and within [0, 1])")]
    InvalidProbability { value: f64 },

    /// A NaN or infinite number was passed where a finite one is required.
    #[error("non-finite {what}: {value}")]
    NonFiniteInput { what: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Validate that `p` is a usable probability.
#[inline]
pub(crate) fn check_probability(p: f64) -> Result<f64> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(CoreError::InvalidProbability { value: p });
    }
    Ok(p)
}

/// Validate that `value` is finite.
#[inline]
pub(crate) fn check_finite(what: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(CoreError::NonFiniteInput { what, value });
    }
    Ok(value)
}
