//! ==============================================================================================
//! =================================== Basis Generator Facade ======================================
//! ==============================================================================================
//!
//! The single entry point application code and the DMD collaborator are expected to drive: hides
//! the naive/fast-update choice, owns the [`TimeIntervalManager`], and exposes the current
//! spatial/temporal bases, singular values and (optionally) the snapshot matrix. A thin, stateful
//! orchestrator in front of the solver, one instance per basis being tracked.

use ndarray::{Array1, Array2, ArrayView1};

use crate::linalg::ProcessGroup;
use crate::scalar::Scalar;
use crate::solvers::{IncrementalSvdConfig, SampleOutcome};
use crate::state::TimeIntervalHistory;

use super::interval_manager::TimeIntervalManager;

pub struct BasisGenerator<T: Scalar, G: ProcessGroup> {
    manager: TimeIntervalManager<T>,
    process_group: G,
    retain_temporal_basis: bool,
    retain_snapshots: bool,
    snapshots_local: Vec<Array1<T>>,
    snapshots_interval_index: usize,
    cached_spatial_basis: Option<Array2<T>>,
}

impl<T: Scalar, G: ProcessGroup> BasisGenerator<T, G> {
    pub fn new(
        config: IncrementalSvdConfig,
        process_group: G,
        retain_temporal_basis: bool,
        retain_snapshots: bool,
    ) -> Self {
        Self {
            manager: TimeIntervalManager::new(config),
            process_group,
            retain_temporal_basis,
            retain_snapshots,
            snapshots_local: Vec::new(),
            snapshots_interval_index: 0,
            cached_spatial_basis: None,
        }
    }

    /// Subsampling hook: the core implementation always says yes. A caller-side policy (e.g.
    /// "only every 10th timestep") may return `false` and skip its own `take_sample` call for
    /// that timestep.
    pub fn is_next_sample_needed(&self, _t: f64) -> bool {
        true
    }

    /// Absorb one snapshot. `u_local` is this process's row-block; its borrow ends when this
    /// call returns.
    pub fn take_sample(&mut self, u_local: ArrayView1<T>, t: f64) -> SampleOutcome {
        let outcome = self.manager.take_sample(u_local, t, &self.process_group);
        self.cached_spatial_basis = None;

        if self.retain_snapshots {
            let current_index = self.manager.current_interval_index();
            if current_index != self.snapshots_interval_index {
                self.snapshots_local.clear();
                self.snapshots_interval_index = current_index;
            }
            self.snapshots_local.push(u_local.to_owned());
        }

        outcome
    }

    /// Force an interval rollover ahead of schedule.
    pub fn force_rollover(&mut self) {
        self.manager.force_rollover();
    }

    /// `U` (naive) or `U · L` (fast), this process's row-block. Collective: the fast variant's
    /// combine happens identically on every process from identical replicated `L`. Cached and
    /// invalidated on the next [`Self::take_sample`].
    pub fn get_spatial_basis(&mut self) -> &Array2<T> {
        if self.cached_spatial_basis.is_none() {
            self.cached_spatial_basis = Some(self.manager.current_factorization().combined_basis());
        }
        self.cached_spatial_basis.as_ref().unwrap()
    }

    pub fn get_singular_values(&self) -> &Array1<T> {
        &self.manager.current_factorization().sigma
    }

    /// `V`, only meaningful if retention was requested at construction. `V` is always maintained
    /// internally regardless — it is part of the augmented-SVD bookkeeping the
    /// redundancy-idempotence invariant depends on — retention only gates whether it is
    /// considered part of this facade's public output.
    pub fn get_temporal_basis(&self) -> Option<&Array2<T>> {
        self.retain_temporal_basis
            .then(|| &self.manager.current_factorization().v)
    }

    /// The current interval's retained snapshot matrix (`d_local × n`), materialized lazily from
    /// the per-snapshot columns accumulated since construction or the last rollover. `None`
    /// unless retention was requested at construction.
    pub fn get_snapshot_matrix(&self) -> Option<Array2<T>> {
        if !self.retain_snapshots || self.snapshots_local.is_empty() {
            return None;
        }
        let d = self.snapshots_local[0].len();
        let n = self.snapshots_local.len();
        let mut s = Array2::<T>::zeros((d, n));
        for (j, col) in self.snapshots_local.iter().enumerate() {
            s.column_mut(j).assign(col);
        }
        Some(s)
    }

    pub fn history(&self) -> &TimeIntervalHistory<T> {
        self.manager.history()
    }

    pub fn config(&self) -> &IncrementalSvdConfig {
        self.manager.config()
    }

    pub fn process_group(&self) -> &G {
        &self.process_group
    }
}
