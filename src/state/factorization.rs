//! ==============================================================================================
//! ==================================== Factorization State ======================================
//! ==============================================================================================
//!
//! The working `(U, L, Σ, V)` of one time interval. `U` holds only this process's local rows;
//! `L`, `Σ`, `V` are small and fully replicated. `r` (current rank) is `sigma.len()`; `n`
//! (snapshots absorbed) is `v.nrows()`. An empty factorization (`r == 0`) marks "not yet
//! initialized for this interval" — the kernel's initial-SVD path.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

#[derive(Clone, Serialize, Deserialize)]
#[serde(bound = "T: Scalar")]
pub struct Factorization<T: Scalar> {
    /// `d_local × r`, this process's row-block of the left basis.
    pub u: Array2<T>,
    /// `r × r`, replicated. Identity after every naive-variant rotation; accumulates deferred
    /// rotations in the fast-update variant.
    pub l: Array2<T>,
    /// Length-`r` singular values, replicated, non-increasing, non-negative.
    pub sigma: Array1<T>,
    /// `n × r`, replicated right basis.
    pub v: Array2<T>,
    /// This process's local row count. Fixed for the lifetime of the factorization.
    pub dim_local: usize,
    /// Timestamp of each row of `V`, in absorption order. Grows exactly in step with `V`'s row
    /// count — which is *not* every `take_sample` call when `skip_redundant` elides a redundant
    /// snapshot's row. Used by [`crate::evaluator::ReducedModelEvaluator`] to find the stored
    /// right-singular vector nearest a query time.
    pub sample_times: Vec<f64>,
}

impl<T: Scalar> Factorization<T> {
    /// A fresh, empty factorization for a process holding `dim_local` local rows.
    pub fn empty(dim_local: usize) -> Self {
        Self {
            u: Array2::zeros((dim_local, 0)),
            l: Array2::zeros((0, 0)),
            sigma: Array1::zeros(0),
            v: Array2::zeros((0, 0)),
            dim_local,
            sample_times: Vec::new(),
        }
    }

    /// Current rank `r`.
    #[inline]
    pub fn rank(&self) -> usize {
        self.sigma.len()
    }

    /// Snapshots absorbed so far in this interval (including redundant ones, which still extend
    /// `V` unless `skip_redundant` is set).
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.v.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rank() == 0
    }

    /// `U · L`: the effective, orthonormal left basis. For the naive variant `L` is always
    /// identity so this is just `U`; for the fast-update variant this is where the deferred
    /// rotations actually get applied. Callers should cache this (see
    /// [`crate::tasks::basis_generator::BasisGenerator::get_spatial_basis`]) rather than
    /// recomputing it on every access.
    pub fn combined_basis(&self) -> Array2<T> {
        if self.l.nrows() == self.u.ncols() && is_identity(&self.l) {
            self.u.clone()
        } else {
            self.u.dot(&self.l)
        }
    }
}

fn is_identity<T: Scalar>(m: &Array2<T>) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            let expected = if i == j { T::one() } else { T::zero() };
            if (m[(i, j)] - expected).abs() > T::epsilon() {
                return false;
            }
        }
    }
    true
}
