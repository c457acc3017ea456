//! ==============================================================================================
//! ======================================= Naive Variant =========================================
//! ==============================================================================================
//!
//! Maintains `U` directly: every accepted new snapshot rotates the *distributed* `U` by the small
//! dense rotation `A` the augmented SVD produced, and `L` is reset to identity immediately after.
//! Periodically re-orthogonalizes to fight the cancellation that direct rotation of `U`
//! accumulates.

use ndarray::{s, Array1, Array2, ArrayView1};
use num_traits::ToPrimitive;

use crate::linalg::{inner_product, ProcessGroup};
use crate::scalar::Scalar;
use crate::solvers::contract::augment_v;
use crate::state::Factorization;

use super::config::IncrementalSvdConfig;

/// Redundant branch: `U` is untouched; `Σ`/`V` truncate back to rank `r`.
pub fn apply_redundant<T: Scalar>(
    factorization: &mut Factorization<T>,
    sigma_prime: &Array1<T>,
    b: &Array2<T>,
) {
    let r = factorization.rank();
    let v_aug = augment_v(&factorization.v);
    let b_trunc = b.slice(s![.., 0..r]).to_owned();
    factorization.v = v_aug.dot(&b_trunc);
    factorization.sigma = sigma_prime.slice(s![0..r]).to_owned();
    // `factorization.u` and `factorization.l` (identity) are unchanged.
}

/// New-column branch: append `j / ||j||` to `U`, then fold the full rotation `A` into `U` itself
/// (`U ← U · A`) and reset `L` to identity — the defining move of the naive variant, as opposed
/// to deferring `A` into `L`.
pub fn apply_new<T: Scalar>(
    factorization: &mut Factorization<T>,
    residual_local: ArrayView1<T>,
    norm_j: T,
    a: &Array2<T>,
    sigma_prime: &Array1<T>,
    b: &Array2<T>,
) {
    let r_old = factorization.rank();
    let r_new = r_old + 1;

    let mut u_ext = Array2::<T>::zeros((factorization.dim_local, r_new));
    u_ext.slice_mut(s![.., 0..r_old]).assign(&factorization.u);
    u_ext
        .column_mut(r_old)
        .assign(&residual_local.mapv(|x| x / norm_j));

    factorization.u = u_ext.dot(a);
    factorization.l = Array2::eye(r_new);

    let v_aug = augment_v(&factorization.v);
    factorization.v = v_aug.dot(b);
    factorization.sigma = sigma_prime.clone();
}

/// A full modified Gram-Schmidt re-orthogonalization of the distributed `U`, with the correction
/// folded into `Σ`/`V` via a small dense SVD of `R · diag(Σ)`: writing `U = Q · R`,
/// the running factorization `U · Σ · V^T` becomes `Q · (R · Σ) · V^T`; a small SVD of `R · Σ`
/// (`A · diag(σ') · B^T`) restores the diagonal form as `Q' = Q · A`, `Σ' = σ'`, `V' = V · B`.
pub fn reorthogonalize<T: Scalar, G: ProcessGroup>(
    factorization: &mut Factorization<T>,
    pg: &G,
) {
    let (q, r_mat) = mgs(&factorization.u, pg);
    let r_sigma = r_mat.dot(&Array2::from_diag(&factorization.sigma));
    let (a, sigma_prime, b) = crate::linalg::small_svd(&r_sigma, pg);

    factorization.u = q.dot(&a);
    factorization.sigma = sigma_prime;
    factorization.v = factorization.v.dot(&b);
}

/// Column-by-column modified Gram-Schmidt of a row-partitioned matrix: returns `(Q, R)` with `Q`'s
/// local rows orthonormal (collectively) and `R` upper-triangular, replicated, such that
/// `U = Q · R`.
fn mgs<T: Scalar, G: ProcessGroup>(u_local: &Array2<T>, pg: &G) -> (Array2<T>, Array2<T>) {
    let (d, r) = u_local.dim();
    let mut q = u_local.clone();
    let mut r_mat = Array2::<T>::zeros((r, r));

    for j in 0..r {
        for i in 0..j {
            let rij = inner_product(q.column(i), q.column(j), pg);
            r_mat[(i, j)] = rij;
            let correction = q.column(i).mapv(|x| x * rij);
            let mut qj = q.column_mut(j);
            qj -= &correction;
        }
        let norm = inner_product(q.column(j), q.column(j), pg).sqrt();
        r_mat[(j, j)] = norm;
        if norm > T::zero() {
            let mut qj = q.column_mut(j);
            qj.mapv_inplace(|x| x / norm);
        }
    }

    debug_assert_eq!(q.nrows(), d);
    (q, r_mat)
}

/// `||U^T U - I||_∞` via pairwise collective inner products — cheap because `r` is small, used to
/// gate whether a scheduled re-orthogonalization pass is actually necessary: checked
/// unconditionally every `effective_reortho_cadence` accepted increments, but the full MGS pass
/// only runs if the deviation exceeds `tau_orth`.
pub fn orthogonality_deviation<T: Scalar, G: ProcessGroup>(u_local: &Array2<T>, pg: &G) -> T {
    let r = u_local.ncols();
    let mut max_dev = T::zero();
    for i in 0..r {
        for j in 0..r {
            let gij = inner_product(u_local.column(i), u_local.column(j), pg);
            let expected = if i == j { T::one() } else { T::zero() };
            let dev = (gij - expected).abs();
            if dev > max_dev {
                max_dev = dev;
            }
        }
    }
    max_dev
}

/// Bookkeeping for the naive variant's periodic orthogonality check. Lives alongside the
/// factorization in [`crate::solvers::Kernel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveState {
    accepted_since_check: usize,
}

impl NaiveState {
    pub fn on_new_increment<T: Scalar, G: ProcessGroup>(
        &mut self,
        factorization: &mut Factorization<T>,
        config: &IncrementalSvdConfig,
        pg: &G,
    ) {
        self.accepted_since_check += 1;
        let cadence = config.effective_reortho_cadence(factorization.rank());
        if self.accepted_since_check < cadence {
            return;
        }
        self.accepted_since_check = 0;

        let deviation = orthogonality_deviation(&factorization.u, pg);
        let tau = T::from(config.tau_orth).expect("tau_orth must fit in T");
        if deviation > tau {
            tracing::debug!(
                deviation = deviation.to_f64().unwrap_or(f64::NAN),
                tau_orth = config.tau_orth,
                "naive variant: re-orthogonalizing U"
            );
            reorthogonalize(factorization, pg);
        }
    }

    pub fn reset(&mut self) {
        self.accepted_since_check = 0;
    }
}
