//! ==============================================================================================
//! =================================== Reduced Model Evaluator =====================================
//! ==============================================================================================
//!
//! Given a real-valued time `t`, computes `U · Σ · v(t)`, where `v(t)` is either the stored
//! right-singular vector at the sample nearest `t`, or (for DMD-style consumers) an externally
//! supplied vector. Stateless except for a cache of the most recent result, invalidated
//! whenever [`crate::tasks::BasisGenerator::take_sample`] mutates the factorization underneath it:
//! a thin evaluator sitting in front of mutable state, caching the last result keyed by query
//! time.

use ndarray::Array1;

use crate::scalar::Scalar;
use crate::state::Factorization;

#[derive(Clone)]
struct CachedEvaluation<T: Scalar> {
    query_time: f64,
    result: Array1<T>,
}

/// Evaluates the current interval's reduced model at a query time, caching the last result.
/// Construct fresh (or call [`Self::invalidate`]) after every mutating `take_sample`.
pub struct ReducedModelEvaluator<T: Scalar> {
    cache: Option<CachedEvaluation<T>>,
}

impl<T: Scalar> Default for ReducedModelEvaluator<T> {
    fn default() -> Self {
        Self { cache: None }
    }
}

impl<T: Scalar> ReducedModelEvaluator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached result. Callers that hold a long-lived evaluator alongside a
    /// [`crate::tasks::BasisGenerator`] must call this after every `take_sample`.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// `U · Σ · v(t)` where `v(t)` is the row of `V` nearest in time to `t`. Returns `None` if the
    /// factorization has not absorbed any snapshot yet.
    pub fn evaluate_at(&mut self, factorization: &Factorization<T>, t: f64) -> Option<Array1<T>> {
        if factorization.is_empty() {
            return None;
        }

        if let Some(cached) = &self.cache {
            if cached.query_time == t {
                return Some(cached.result.clone());
            }
        }

        let index = nearest_sample_index(&factorization.sample_times, t)?;
        let v_row = factorization.v.row(index).to_owned();
        let result = self.evaluate_with(factorization, v_row.view());

        self.cache = Some(CachedEvaluation {
            query_time: t,
            result: result.clone(),
        });
        Some(result)
    }

    /// `U · Σ · v` for an externally supplied `v`, e.g. from a DMD-style consumer. Does not touch
    /// the time cache, since there is no query time to key it on.
    pub fn evaluate_with(&self, factorization: &Factorization<T>, v: ndarray::ArrayView1<T>) -> Array1<T> {
        assert_eq!(
            v.len(),
            factorization.rank(),
            "evaluate_with: vector length ({}) must match current rank ({})",
            v.len(),
            factorization.rank()
        );
        let scaled: Array1<T> = &v * &factorization.sigma;
        let combined = factorization.combined_basis();
        combined.dot(&scaled)
    }
}

/// Index of the entry in `sample_times` closest to `t`. `sample_times` is in absorption order
/// (non-decreasing, since `take_sample` asserts `t >= 0` monotonically increasing callers supply),
/// so a linear scan tracking the best-so-far distance is sufficient; no binary search is assumed
/// since callers are not required to feed strictly increasing times.
fn nearest_sample_index(sample_times: &[f64], t: f64) -> Option<usize> {
    sample_times
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (**a - t).abs().partial_cmp(&(**b - t).abs()).unwrap()
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn sample_factorization() -> Factorization<f64> {
        Factorization {
            u: array![[1.0, 0.0], [0.0, 1.0]],
            l: Array2::eye(2),
            sigma: array![2.0, 1.0],
            v: array![[1.0, 0.0], [0.0, 1.0]],
            dim_local: 2,
            sample_times: vec![0.0, 1.0],
        }
    }

    #[test]
    fn evaluates_at_nearest_sample() {
        let factorization = sample_factorization();
        let mut evaluator = ReducedModelEvaluator::new();

        let result = evaluator.evaluate_at(&factorization, 0.1).unwrap();
        assert_eq!(result, array![2.0, 0.0]);

        let result = evaluator.evaluate_at(&factorization, 0.9).unwrap();
        assert_eq!(result, array![0.0, 1.0]);
    }

    #[test]
    fn caches_repeat_query() {
        let factorization = sample_factorization();
        let mut evaluator = ReducedModelEvaluator::new();

        let first = evaluator.evaluate_at(&factorization, 0.0).unwrap();
        let second = evaluator.evaluate_at(&factorization, 0.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_factorization_returns_none() {
        let factorization: Factorization<f64> = Factorization::empty(3);
        let mut evaluator = ReducedModelEvaluator::new();
        assert!(evaluator.evaluate_at(&factorization, 0.0).is_none());
    }

    #[test]
    fn evaluate_with_external_vector() {
        let factorization = sample_factorization();
        let evaluator = ReducedModelEvaluator::new();
        let v = array![1.0, 1.0];
        let result = evaluator.evaluate_with(&factorization, v.view());
        assert_eq!(result, array![2.0, 1.0]);
    }
}
