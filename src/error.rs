//! ==============================================================================================
//! ====================================== Error Kinds ============================================
//! ==============================================================================================
//!
//! Programmer errors (non-positive dimensions, non-positive tolerances, ...) are preconditions:
//! per the bulk-synchronous contract, the crate's public entry points either succeed or abort the
//! process group. `ConfigError` names the kinds so they can be unit-tested and logged before the
//! abort; nothing downstream of construction ever sees this type.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("dim must be strictly positive, got {0}")]
    NonPositiveDim(usize),

    #[error("redundancy_tol (epsilon) must be strictly positive, got {0}")]
    NonPositiveEpsilon(f64),

    #[error("max_increments_per_interval must be strictly positive, got {0}")]
    NonPositiveMaxIncrements(usize),

    #[error("tau_orth must be strictly positive, got {0}")]
    NonPositiveTauOrth(f64),

    #[error("k_reortho must be strictly positive, got {0}")]
    NonPositiveReorthoCadence(usize),
}
