//! ==============================================================================================
//! =================================== Time-Interval Manager ======================================
//! ==============================================================================================
//!
//! Partitions the snapshot stream into bounded-size intervals, each with its own fresh
//! factorization. Rollover happens before a snapshot that would overflow
//! `max_increments_per_interval` is absorbed, or on an explicit external signal
//! ([`TimeIntervalManager::force_rollover`]); the retiring interval's factorization is frozen into
//! [`TimeIntervalHistory`] and a fresh, empty one takes its place.

use ndarray::ArrayView1;

use crate::linalg::ProcessGroup;
use crate::scalar::Scalar;
use crate::solvers::{IncrementalSvdConfig, Kernel, SampleOutcome};
use crate::state::{Factorization, TimeIntervalHistory};

pub struct TimeIntervalManager<T: Scalar> {
    config: IncrementalSvdConfig,
    kernel: Kernel<T>,
    factorization: Factorization<T>,
    current_interval_start: Option<f64>,
    history: TimeIntervalHistory<T>,
}

impl<T: Scalar> TimeIntervalManager<T> {
    pub fn new(config: IncrementalSvdConfig) -> Self {
        config
            .validate()
            .expect("invalid incremental-SVD configuration");

        Self {
            kernel: Kernel::new(config.variant),
            factorization: Factorization::empty(config.dim),
            current_interval_start: None,
            history: TimeIntervalHistory::new(),
            config,
        }
    }

    /// Absorb one snapshot, rolling over to a fresh interval first if the current one is full.
    pub fn take_sample<G: ProcessGroup>(
        &mut self,
        u_local: ArrayView1<T>,
        t: f64,
        pg: &G,
    ) -> SampleOutcome {
        assert!(t >= 0.0, "take_sample: time must be non-negative, got {t}");

        if self.factorization.num_samples() >= self.config.max_increments_per_interval {
            self.rollover();
        }
        if self.current_interval_start.is_none() {
            self.current_interval_start = Some(t);
        }

        self.kernel
            .take_sample(&mut self.factorization, u_local, t, &self.config, pg)
    }

    /// Roll over to a fresh interval on an external signal, even if the current one is not yet
    /// full. A no-op if the current interval has no snapshots yet.
    pub fn force_rollover(&mut self) {
        if self.factorization.num_samples() > 0 {
            self.rollover();
        }
    }

    fn rollover(&mut self) {
        let start = self.current_interval_start.take().unwrap_or(0.0);
        let finished = std::mem::replace(&mut self.factorization, Factorization::empty(self.config.dim));
        let index = self.history.retire(start, finished);
        self.kernel.reset_for_new_interval();
        tracing::info!(interval = index, "time interval rolled over");
    }

    pub fn current_factorization(&self) -> &Factorization<T> {
        &self.factorization
    }

    /// Index of the interval currently being absorbed into (equal to the number of retired
    /// intervals so far). Lets callers detect a rollover between two `take_sample` calls without
    /// inspecting history contents.
    pub fn current_interval_index(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &TimeIntervalHistory<T> {
        &self.history
    }

    pub fn config(&self) -> &IncrementalSvdConfig {
        &self.config
    }
}
