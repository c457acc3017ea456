//! ==============================================================================================
//! ============================ Small, Fully-Replicated Dense Kernels ===========================
//! ==============================================================================================
//!
//! `Σ`, `V`, `L` and every augmented `(r+1) × (r+1)` matrix the kernel builds are small and fully
//! replicated rather than row-partitioned. Every process runs the exact same dense LAPACK call on
//! the exact same input and must get the exact same answer; `small_svd` additionally broadcasts
//! rank 0's result so that holds even if two processes somehow linked against different LAPACK
//! builds.

use ndarray::{Array1, Array2};
use ndarray_linalg::SVD;

use super::process_group::ProcessGroup;
use crate::scalar::Scalar;

/// Dense SVD of a small replicated matrix `M = A · diag(σ) · B^T`, returning `(A, σ, B)` with `B`
/// already in "right factor", not transposed, form (i.e. `M = A * diag(sigma) * B.t()`).
///
/// `M` is always small (at most one larger than the current rank); this is never called on
/// anything row-partitioned.
pub fn small_svd<T: Scalar, G: ProcessGroup>(m: &Array2<T>, pg: &G) -> (Array2<T>, Array1<T>, Array2<T>) {
    let (u, sigma, vt) = m
        .svd(true, true)
        .expect("small_svd: dense LAPACK SVD of a small replicated matrix failed");
    let mut u = u.expect("small_svd: requested U but LAPACK returned none");
    let mut sigma = sigma;
    let mut vt = vt.expect("small_svd: requested V^T but LAPACK returned none");

    // Broadcast rank 0's factors so every process agrees bit-for-bit, closing the gap between
    // "run identically everywhere" and "is actually identical everywhere".
    pg.broadcast_from_root(u.as_slice_mut().expect("contiguous U"));
    pg.broadcast_from_root(sigma.as_slice_mut().expect("contiguous sigma"));
    pg.broadcast_from_root(vt.as_slice_mut().expect("contiguous Vt"));

    let v = vt.reversed_axes();
    (u, sigma, v)
}

/// `X · Y` for two small, fully-replicated matrices. No communication: every process already has
/// identical copies of both operands.
pub fn small_matmul<T: Scalar>(x: &Array2<T>, y: &Array2<T>) -> Array2<T> {
    assert_eq!(
        x.ncols(),
        y.nrows(),
        "small_matmul: inner dimension mismatch ({} vs {})",
        x.ncols(),
        y.nrows()
    );
    x.dot(y)
}
