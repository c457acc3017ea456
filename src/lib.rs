//! ==============================================================================================
//! ================================ incremental-svd-rom-rs =======================================
//! ==============================================================================================
//!
//! An incremental (streaming) SVD engine for building reduced-order bases from distributed,
//! time-stepped simulation state. Snapshots arrive one row-partitioned vector at a time; the
//! factorization `U · Σ · V^T` is updated in place without ever re-assembling the full
//! snapshot history. Two interchangeable kernels share one contract ([`solvers::Kernel`]):
//! `naive`, which keeps `U` exactly orthonormal via periodic re-orthogonalization, and
//! `fast_update`, which defers rotations into a small replicated mixer and accepts looser,
//! algebraic orthogonality in exchange for avoiding the per-step rotation of the full local `U`.
//!
//! Snapshots are grouped into bounded-size time intervals ([`tasks::TimeIntervalManager`]), each
//! with its own independent factorization; [`tasks::BasisGenerator`] is the façade application code
//! and the DMD collaborator are expected to drive, and [`evaluator::ReducedModelEvaluator`]
//! evaluates the resulting reduced model at a query time.

pub mod error;
pub mod evaluator;
pub mod linalg;
pub mod scalar;
pub mod solvers;
pub mod state;
pub mod tasks;

pub mod demos;

#[cfg(test)]
mod tests;

pub use error::ConfigError;
pub use evaluator::ReducedModelEvaluator;
pub use linalg::{ProcessGroup, SingleProcess, ThreadedProcessGroup};
pub use scalar::Scalar;
pub use solvers::{IncrementalSvdConfig, SampleOutcome, Variant};
pub use state::{Factorization, IntervalRecord, TimeIntervalHistory};
pub use tasks::{BasisGenerator, TimeIntervalManager};
