//! ==============================================================================================
//! ================================ Shared Per-Snapshot Math ======================================
//! ==============================================================================================
//!
//! The project/correct/decide/build-augmented-matrix steps are identical for both variants; only
//! applying the augmented SVD back onto `(U, L, Σ, V)` differs, which is why that part lives in
//! `naive`/`fast_update` instead of here.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::linalg::{inner_product, local_matvec, ProcessGroup};
use crate::scalar::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The snapshot's residual against the current basis was below `epsilon`; rank did not grow.
    Redundant,
    /// The snapshot extended the basis by one column; rank grew by one.
    New,
}

/// Result of projecting a snapshot onto the current combined basis and running the one
/// mandatory modified-Gram-Schmidt correction pass.
pub struct Projection<T: Scalar> {
    /// Length-`r` projection coefficients, replicated.
    pub ell: Array1<T>,
    /// Local residual `j`, this process's rows only.
    pub residual_local: Array1<T>,
    /// `||j||`, replicated.
    pub norm_j: T,
}

/// Project `u_local` onto `combined_basis_local` (= `U · L`'s local rows) and apply the single
/// unconditional modified-Gram-Schmidt correction pass required to combat cancellation.
pub fn project_and_correct<T: Scalar, G: ProcessGroup>(
    combined_basis_local: ArrayView2<T>,
    u_local: ArrayView1<T>,
    pg: &G,
) -> Projection<T> {
    let mut ell = local_matvec(combined_basis_local, u_local, pg);
    let mut residual_local = &u_local.to_owned() - &combined_basis_local.dot(&ell);

    // One MGS correction pass, unconditional.
    let delta_ell = local_matvec(combined_basis_local, residual_local.view(), pg);
    residual_local = &residual_local - &combined_basis_local.dot(&delta_ell);
    ell = &ell + &delta_ell;

    let norm_j = inner_product(residual_local.view(), residual_local.view(), pg).sqrt();

    Projection {
        ell,
        residual_local,
        norm_j,
    }
}

/// Build `Q = [[Σ, ℓ], [0ᵀ, norm_j]]`, the `(r+1) × (r+1)` augmented matrix fed to the small SVD.
pub fn build_augmented<T: Scalar>(sigma: &Array1<T>, ell: &Array1<T>, norm_j: T) -> Array2<T> {
    let r = sigma.len();
    assert_eq!(ell.len(), r, "build_augmented: ell length must equal current rank");

    let mut q = Array2::<T>::zeros((r + 1, r + 1));
    for i in 0..r {
        q[(i, i)] = sigma[i];
        q[(i, r)] = ell[i];
    }
    q[(r, r)] = norm_j;
    q
}

/// Extend `V` (`n × r`, replicated) to `[[V, 0], [0ᵀ, 1]]` (`(n+1) × (r+1)`) ahead of the
/// `· B` right-multiply both branches perform to apply the update.
pub fn augment_v<T: Scalar>(v: &Array2<T>) -> Array2<T> {
    let (n, r) = v.dim();
    let mut augmented = Array2::<T>::zeros((n + 1, r + 1));
    augmented.slice_mut(ndarray::s![0..n, 0..r]).assign(v);
    augmented[(n, r)] = T::one();
    augmented
}
