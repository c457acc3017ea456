//! ==============================================================================================
//! ===================================== Numeric Scalar =========================================
//! ==============================================================================================
//!
//! The crate is generic over the floating-point type used for snapshot entries, singular values
//! and all small replicated matrices. `f32` and `f64` are both supported; LAPACK routines need a
//! type LAPACK actually has a kernel for, so the bound includes `ndarray_linalg::Lapack`. Complex
//! scalars are out of scope, so the bound pins `Lapack::Real` back to `Self`, letting callers treat
//! a LAPACK routine's singular-value/real-part outputs as plain `T` without a conversion step.

use ndarray::ScalarOperand;
use ndarray_linalg::Lapack;
use num_traits::Float;
use serde::Serialize;
use std::iter::Sum;

pub trait Scalar:
    Float + Lapack<Real = Self> + ScalarOperand + Copy + Default + Send + Sync + Serialize + Sum<Self> + 'static
{
}

impl<T> Scalar for T where
    T: Float
        + Lapack<Real = T>
        + ScalarOperand
        + Copy
        + Default
        + Send
        + Sync
        + Serialize
        + Sum<T>
        + 'static
{
}
