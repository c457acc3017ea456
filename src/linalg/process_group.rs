//! ==============================================================================================
//! ======================================= Process Group =========================================
//! ==============================================================================================
//!
//! The transport every collective in `distributed` and `dense` goes through. The retrieval pack
//! this crate was grown from carries no MPI binding (or any other real multi-host transport), so
//! rather than fabricate one, the group is a small trait with two implementors: `SingleProcess`
//! (rank 0 of 1, no communication — the common case for unit tests and single-rank runs) and
//! `ThreadedProcessGroup`, which emulates SPMD across OS threads inside one process using
//! `crossbeam::thread::scope` (so per-rank row blocks can be borrowed rather than cloned) plus a
//! shared reduction buffer behind a barrier pair. A real MPI-backed implementor would slot in
//! behind the same trait without touching `distributed`/`dense`/the kernel.

use num_traits::{NumCast, ToPrimitive};
use std::sync::{Arc, Barrier, Mutex};

use crate::scalar::Scalar;

/// A collective transport: every method here must be called by every rank, in the same order,
/// with arguments differing only in the per-rank local data.
pub trait ProcessGroup: Send + Sync {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Replace `local` in place with the element-wise sum across all ranks. Reduction happens in
    /// `f64` regardless of `T`; `T` is converted to and from `f64` at the boundary, which is
    /// lossless for `f32`/`f64` and a no-op for `f64`.
    fn all_reduce_sum<T: Scalar>(&self, local: &mut [T]);

    /// Broadcast rank 0's buffer to every other rank, overwriting their copy. Used to pin the
    /// dense-SVD result bit-identical across ranks even if two processes somehow disagreed.
    fn broadcast_from_root<T: Scalar>(&self, buf: &mut [T]);
}

/// Single-rank transport: every collective is a local no-op, because there is nothing to reduce
/// against. This is the default for library users running one process per row-block (or for
/// tests that don't care about cross-process determinism).
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl ProcessGroup for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum<T: Scalar>(&self, _local: &mut [T]) {
        // size == 1: the local value already is the global sum.
    }

    fn broadcast_from_root<T: Scalar>(&self, _buf: &mut [T]) {
        // size == 1: rank 0 is the only rank.
    }
}

/// Shared rendezvous state for one `ThreadedProcessGroup` instance. Three barriers bound each
/// reduce: all ranks must finish *contributing* to `buf` before any rank may *read* it, all ranks
/// must finish *reading* before the leader may clear it, and all ranks must see it *cleared*
/// before any of them can start the next round's accumulation — without that last barrier a fast
/// rank can re-enter `reduce` and start accumulating into `buf` (or the leader can wipe a fast
/// rank's fresh contribution) before every rank has left the previous round.
struct Rendezvous {
    buf: Mutex<Vec<f64>>,
    contributed: Barrier,
    read: Barrier,
    cleared: Barrier,
}

impl Rendezvous {
    fn new(size: usize) -> Self {
        Self {
            buf: Mutex::new(Vec::new()),
            contributed: Barrier::new(size),
            read: Barrier::new(size),
            cleared: Barrier::new(size),
        }
    }

    fn reduce(&self, rank: usize, local: &mut [f64]) {
        {
            let mut buf = self.buf.lock().expect("rendezvous buffer poisoned");
            if buf.len() != local.len() {
                // First rank through this round (re)sizes the shared buffer. Every rank passes
                // the same `local.len()` by construction (same collective, same shape), so this
                // races harmlessly: whichever rank gets here first wins, and it's the right size.
                buf.clear();
                buf.resize(local.len(), 0.0);
            }
            for (slot, v) in buf.iter_mut().zip(local.iter()) {
                *slot += *v;
            }
        }
        self.contributed.wait();

        {
            let buf = self.buf.lock().expect("rendezvous buffer poisoned");
            local.copy_from_slice(&buf);
        }
        let leader = self.read.wait().is_leader();

        if leader {
            let mut buf = self.buf.lock().expect("rendezvous buffer poisoned");
            buf.iter_mut().for_each(|v| *v = 0.0);
        }
        self.cleared.wait();
        let _ = rank;
    }

    fn broadcast(&self, rank: usize, buf_local: &mut [f64]) {
        {
            let mut shared = self.buf.lock().expect("rendezvous buffer poisoned");
            if rank == 0 {
                shared.clear();
                shared.extend_from_slice(buf_local);
            }
        }
        self.contributed.wait();
        {
            let shared = self.buf.lock().expect("rendezvous buffer poisoned");
            if rank != 0 {
                buf_local.copy_from_slice(&shared);
            }
        }
        self.read.wait();
    }
}

/// One rank's handle into an in-process SPMD emulation. Construct a group of these with
/// [`ThreadedProcessGroup::spawn`], which hands each rank's closure its own handle inside a
/// `crossbeam::thread::scope` so row-blocks can be borrowed for the scope's lifetime.
pub struct ThreadedProcessGroup {
    rank: usize,
    size: usize,
    rendezvous: Arc<Rendezvous>,
}

impl ThreadedProcessGroup {
    /// Run `body` once per rank (`0..size`), each on its own OS thread, and collect the
    /// per-rank return values in rank order. `body` is `Sync` so it can be shared across the
    /// spawned threads; give each rank its row-block by indexing into data borrowed from the
    /// caller's stack.
    pub fn spawn<F, R>(size: usize, body: F) -> Vec<R>
    where
        F: Fn(ThreadedProcessGroup) -> R + Sync,
        R: Send,
    {
        assert!(size > 0, "process group size must be strictly positive");
        let rendezvous = Arc::new(Rendezvous::new(size));

        crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = (0..size)
                .map(|rank| {
                    let rendezvous = Arc::clone(&rendezvous);
                    let body = &body;
                    scope.spawn(move |_| {
                        body(ThreadedProcessGroup {
                            rank,
                            size,
                            rendezvous,
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("process-group worker thread panicked"))
                .collect()
        })
        .expect("process-group scope panicked")
    }
}

impl ProcessGroup for ThreadedProcessGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_sum<T: Scalar>(&self, local: &mut [T]) {
        let mut as_f64: Vec<f64> = local
            .iter()
            .map(|x| x.to_f64().expect("scalar must be representable as f64"))
            .collect();
        self.rendezvous.reduce(self.rank, &mut as_f64);
        for (dst, v) in local.iter_mut().zip(as_f64.into_iter()) {
            *dst = NumCast::from(v).expect("f64 reduction result must round-trip into T");
        }
    }

    fn broadcast_from_root<T: Scalar>(&self, buf: &mut [T]) {
        let mut as_f64: Vec<f64> = buf
            .iter()
            .map(|x| x.to_f64().expect("scalar must be representable as f64"))
            .collect();
        self.rendezvous.broadcast(self.rank, &mut as_f64);
        for (dst, v) in buf.iter_mut().zip(as_f64.into_iter()) {
            *dst = NumCast::from(v).expect("f64 broadcast result must round-trip into T");
        }
    }
}
