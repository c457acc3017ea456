//! ==============================================================================================
//! ================================= Time-Interval History =======================================
//! ==============================================================================================
//!
//! What survives an interval rollover: the frozen `(U, L, Σ, V)` the interval ended with, plus the
//! time its first snapshot was absorbed. One container accumulating finished per-interval
//! records, each holding a whole interval's factorization rather than one state vector.

use serde::{Deserialize, Serialize};

use super::factorization::Factorization;
use crate::scalar::Scalar;

#[derive(Clone, Serialize, Deserialize)]
#[serde(bound = "T: Scalar")]
pub struct IntervalRecord<T: Scalar> {
    pub index: usize,
    pub start_time: f64,
    pub factorization: Factorization<T>,
}

/// Replicated, append-only record of every retired interval. The in-progress interval's
/// factorization lives elsewhere (the kernel owns it); only *retired* intervals are kept here,
/// keyed by index for the external basis-writer collaborator.
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(bound = "T: Scalar")]
pub struct TimeIntervalHistory<T: Scalar> {
    records: Vec<IntervalRecord<T>>,
}

impl<T: Scalar> TimeIntervalHistory<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Freeze `factorization` as the record for the interval that just retired.
    pub fn retire(&mut self, start_time: f64, factorization: Factorization<T>) -> usize {
        let index = self.records.len();
        self.records.push(IntervalRecord {
            index,
            start_time,
            factorization,
        });
        index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&IntervalRecord<T>> {
        self.records.get(index)
    }

    /// The replicated `time_interval_starts` sequence, in rollover order.
    pub fn starts(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.start_time).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntervalRecord<T>> {
        self.records.iter()
    }
}
