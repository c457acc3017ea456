//! ==============================================================================================
//! =================================== Incremental SVD Kernel ====================================
//! ==============================================================================================
//!
//! `Kernel` is the tagged choice between the two variants that share one update contract: a
//! closed enum rather than a trait-object plugin point, since there are and will only ever be two
//! implementations. `take_sample` runs the shared steps (project, MGS-correct, decide, augmented
//! SVD) once and dispatches only the branch-specific "apply the update" step and the naive
//! variant's periodic re-orthogonalization.

pub mod config;
pub mod contract;
pub mod fast_update;
pub mod naive;

pub use config::{IncrementalSvdConfig, Variant};
pub use contract::SampleOutcome;

use ndarray::{Array1, Array2, ArrayView1};
use num_traits::ToPrimitive;

use crate::linalg::{inner_product, small_svd, ProcessGroup};
use crate::scalar::Scalar;
use crate::state::Factorization;

pub enum Kernel<T: Scalar> {
    Naive(naive::NaiveState),
    FastUpdate(fast_update::DriftCounter),
}

impl<T: Scalar> Kernel<T> {
    pub fn new(variant: Variant) -> Self {
        match variant {
            Variant::Naive => Kernel::Naive(naive::NaiveState::default()),
            Variant::FastUpdate => Kernel::FastUpdate(fast_update::DriftCounter::default()),
        }
    }

    /// Reset per-interval bookkeeping on rollover. The fast variant's drift counter is
    /// deliberately process-lifetime, not per-interval — it is a diagnostic, not part of the
    /// factorization contract.
    pub fn reset_for_new_interval(&mut self) {
        if let Kernel::Naive(state) = self {
            state.reset();
        }
    }

    /// Absorb one snapshot. `u_local` is this process's row-block only; its lifetime ends when
    /// this call returns — the kernel must not retain the borrow.
    pub fn take_sample<G: ProcessGroup>(
        &mut self,
        factorization: &mut Factorization<T>,
        u_local: ArrayView1<T>,
        t: f64,
        config: &IncrementalSvdConfig,
        pg: &G,
    ) -> SampleOutcome {
        assert_eq!(
            u_local.len(),
            factorization.dim_local,
            "take_sample: row-block length ({}) must match dim_local ({})",
            u_local.len(),
            factorization.dim_local
        );

        if factorization.is_empty() {
            return self.initialize(factorization, u_local, t, config, pg);
        }

        let epsilon = T::from(config.epsilon).expect("epsilon must be representable in T");

        // Project onto the current basis and run the mandatory MGS correction pass.
        let combined = factorization.combined_basis();
        let projection = contract::project_and_correct(combined.view(), u_local, pg);

        // Redundancy decision.
        let redundant = projection.norm_j < epsilon;

        // Augmented SVD, unconditional regardless of which branch below ends up using it.
        let q = contract::build_augmented(&factorization.sigma, &projection.ell, projection.norm_j);
        let (a, sigma_prime, b) = small_svd(&q, pg);

        // Apply the update.
        if redundant {
            tracing::debug!(
                norm_j = projection.norm_j.to_f64().unwrap_or(f64::NAN),
                epsilon = config.epsilon,
                "snapshot classified redundant"
            );
            if !config.skip_redundant {
                match self {
                    Kernel::Naive(_) => naive::apply_redundant(factorization, &sigma_prime, &b),
                    Kernel::FastUpdate(_) => {
                        fast_update::apply_redundant(factorization, &a, &sigma_prime, &b)
                    }
                }
                factorization.sample_times.push(t);
            }
            self.record_drift(factorization, config, pg);
            SampleOutcome::Redundant
        } else {
            match self {
                Kernel::Naive(state) => {
                    naive::apply_new(
                        factorization,
                        projection.residual_local.view(),
                        projection.norm_j,
                        &a,
                        &sigma_prime,
                        &b,
                    );
                    state.on_new_increment(factorization, config, pg);
                }
                Kernel::FastUpdate(_) => {
                    fast_update::apply_new(
                        factorization,
                        projection.residual_local.view(),
                        projection.norm_j,
                        &a,
                        &sigma_prime,
                        &b,
                    );
                }
            }
            factorization.sample_times.push(t);
            self.record_drift(factorization, config, pg);
            SampleOutcome::New
        }
    }

    fn record_drift<G: ProcessGroup>(&self, factorization: &Factorization<T>, config: &IncrementalSvdConfig, pg: &G) {
        if let Kernel::FastUpdate(drift) = self {
            let combined = factorization.combined_basis();
            drift.record(&combined, config.tau_orth, pg);
        }
    }

    /// The first snapshot of an interval sets `r = 1` directly, no augmented SVD needed. An
    /// exactly-zero (or sub-epsilon) snapshot is treated as always redundant and leaves the
    /// factorization empty.
    fn initialize<G: ProcessGroup>(
        &mut self,
        factorization: &mut Factorization<T>,
        u_local: ArrayView1<T>,
        t: f64,
        config: &IncrementalSvdConfig,
        pg: &G,
    ) -> SampleOutcome {
        let epsilon = T::from(config.epsilon).expect("epsilon must be representable in T");
        let norm = inner_product(u_local, u_local, pg).sqrt();

        if norm < epsilon {
            tracing::debug!("zero (or near-zero) snapshot on an empty factorization: redundant, no-op");
            return SampleOutcome::Redundant;
        }

        factorization.u = Array2::from_shape_fn((factorization.dim_local, 1), |(i, _)| u_local[i] / norm);
        factorization.l = Array2::eye(1);
        factorization.sigma = Array1::from_elem(1, norm);
        factorization.v = Array2::from_elem((1, 1), T::one());
        factorization.sample_times.push(t);

        tracing::info!(norm = norm.to_f64().unwrap_or(f64::NAN), "initial SVD for new interval");
        SampleOutcome::New
    }
}
