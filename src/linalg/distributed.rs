//! ==============================================================================================
//! ================================ Row-Partitioned Vector Ops ==================================
//! ==============================================================================================
//!
//! `U` is `d × r`, row-partitioned: each process holds only its own `d` local rows, all `r`
//! columns. These helpers are the only place local row-blocks and the collective transport meet.

use ndarray::{Array1, ArrayView1, ArrayView2};

use super::process_group::ProcessGroup;
use crate::scalar::Scalar;

/// `p_local = U_local^T · x_local`, all-reduced across the group: a length-`r` replicated result
/// from each process's local `d × r` row-block and length-`d` local vector. No assumption is made
/// about how `d` is split across ranks beyond "it partitions the global rows".
pub fn local_matvec<T: Scalar, G: ProcessGroup>(
    u_local: ArrayView2<T>,
    x_local: ArrayView1<T>,
    pg: &G,
) -> Array1<T> {
    assert_eq!(
        u_local.nrows(),
        x_local.len(),
        "local_matvec: U_local rows ({}) must match x_local length ({})",
        u_local.nrows(),
        x_local.len()
    );

    let mut p = u_local.t().dot(&x_local);
    pg.all_reduce_sum(p.as_slice_mut().expect("contiguous result"));
    p
}

/// Collective dot product `<x, y>` summed over every process's local rows.
pub fn inner_product<T: Scalar, G: ProcessGroup>(
    x_local: ArrayView1<T>,
    y_local: ArrayView1<T>,
    pg: &G,
) -> T {
    assert_eq!(
        x_local.len(),
        y_local.len(),
        "inner_product: length mismatch ({} vs {})",
        x_local.len(),
        y_local.len()
    );

    let mut acc = [x_local.dot(&y_local)];
    pg.all_reduce_sum(&mut acc);
    acc[0]
}

/// `y_local <- alpha * x_local + beta * y_local`, purely local (no communication): every process
/// applies the same replicated scalars `alpha`/`beta` to its own row-block.
pub fn axpby_local<T: Scalar>(
    alpha: T,
    x_local: ArrayView1<T>,
    beta: T,
    y_local: &mut ndarray::ArrayViewMut1<T>,
) {
    assert_eq!(
        x_local.len(),
        y_local.len(),
        "axpby_local: length mismatch ({} vs {})",
        x_local.len(),
        y_local.len()
    );

    ndarray::Zip::from(y_local).and(&x_local).for_each(|y, &x| {
        *y = alpha * x + beta * *y;
    });
}
