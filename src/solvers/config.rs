//! ==============================================================================================
//! ===================================== Kernel Configuration ====================================
//! ==============================================================================================

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which of the two algorithms sharing the incremental-SVD update contract drives `take_sample`.
/// A closed choice, not a plugin point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Maintains `U` directly; periodically re-orthogonalizes.
    Naive,
    /// Maintains an implicit mixer `L` such that the true left basis is `U · L`, deferring
    /// rotations away from the distributed `U`.
    FastUpdate,
}

/// Builder-style configuration. Construction never fails; call
/// [`IncrementalSvdConfig::validate`] once at the facade's entry point and `.expect(...)` the
/// result — preconditions abort the process group, they do not propagate as a caller-visible
/// error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IncrementalSvdConfig {
    pub dim: usize,
    pub epsilon: f64,
    pub skip_redundant: bool,
    pub max_increments_per_interval: usize,
    pub variant: Variant,
    /// Loss-of-orthogonality threshold for the naive variant's periodic check. Recommended
    /// default: `sqrt(machine_epsilon)`.
    pub tau_orth: f64,
    /// Re-orthogonalize every `k_reortho` accepted new increments if set; `None` defaults to
    /// "every `r` accepted new increments", which shrinks as the basis grows.
    pub k_reortho: Option<usize>,
}

impl IncrementalSvdConfig {
    pub fn new(dim: usize, epsilon: f64, max_increments_per_interval: usize, variant: Variant) -> Self {
        Self {
            dim,
            epsilon,
            skip_redundant: false,
            max_increments_per_interval,
            variant,
            tau_orth: f64::EPSILON.sqrt(),
            k_reortho: None,
        }
    }

    pub fn skip_redundant(mut self, skip_redundant: bool) -> Self {
        self.skip_redundant = skip_redundant;
        self
    }

    pub fn tau_orth(mut self, tau_orth: f64) -> Self {
        self.tau_orth = tau_orth;
        self
    }

    pub fn reortho_cadence(mut self, k_reortho: usize) -> Self {
        self.k_reortho = Some(k_reortho);
        self
    }

    /// The effective re-orthogonalization cadence for a factorization currently at rank `r`:
    /// defaults to `r`, floored at 1 so a rank-0/1 factorization still gets checked.
    pub fn effective_reortho_cadence(&self, r: usize) -> usize {
        self.k_reortho.unwrap_or(r.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dim == 0 {
            return Err(ConfigError::NonPositiveDim(self.dim));
        }
        if !(self.epsilon > 0.0) {
            return Err(ConfigError::NonPositiveEpsilon(self.epsilon));
        }
        if self.max_increments_per_interval == 0 {
            return Err(ConfigError::NonPositiveMaxIncrements(self.max_increments_per_interval));
        }
        if !(self.tau_orth > 0.0) {
            return Err(ConfigError::NonPositiveTauOrth(self.tau_orth));
        }
        if let Some(k) = self.k_reortho {
            if k == 0 {
                return Err(ConfigError::NonPositiveReorthoCadence(k));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let config = IncrementalSvdConfig::new(8, 1e-9, 50, Variant::FastUpdate)
            .skip_redundant(true)
            .tau_orth(1e-6)
            .reortho_cadence(4);

        let json = serde_json::to_string(&config).expect("serialize");
        let restored: IncrementalSvdConfig = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.dim, config.dim);
        assert_eq!(restored.epsilon, config.epsilon);
        assert_eq!(restored.skip_redundant, config.skip_redundant);
        assert_eq!(restored.variant, config.variant);
        assert_eq!(restored.tau_orth, config.tau_orth);
        assert_eq!(restored.k_reortho, config.k_reortho);
    }

    #[test]
    fn rejects_non_positive_dim() {
        let config = IncrementalSvdConfig::new(0, 1e-9, 10, Variant::Naive);
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveDim(0)));
    }

    #[test]
    fn default_reortho_cadence_tracks_rank() {
        let config = IncrementalSvdConfig::new(4, 1e-9, 10, Variant::Naive);
        assert_eq!(config.effective_reortho_cadence(0), 1);
        assert_eq!(config.effective_reortho_cadence(5), 5);
    }
}
