use crate::diagnostics::BatchStats;
use std::sync::{Barrier, Mutex};

/// Per-worker identity and iteration state. Owned by exactly one worker
/// thread; `rank` is assigned at spawn and never changes. `avg_fac` is
/// recomputed every iteration by the step-count round.
#[derive(Clone, Debug)]
pub struct WorkerContext {
    pub rank: usize,
    pub n_workers: usize,
    pub avg_fac: f64,
}

impl WorkerContext {
    pub fn new(rank: usize, n_workers: usize) -> Self {
        Self {
            rank,
            n_workers,
            avg_fac: 1.0 / n_workers as f64,
        }
    }

    pub fn is_leader(&self) -> bool {
        self.rank == 0
    }
}

/// Two-phase leader-reduce over a shared slot.
///
/// Every participating worker calls `reduce` exactly once per round. The
/// leader overwrites the slot and signals the entry barrier; everyone else
/// waits for that signal and then merges its local value under the slot
/// lock. The exit barrier holds all workers until every merge has
/// committed, after which each worker reads the final value, and a last
/// round-end barrier keeps the leader from starting the next round's
/// overwrite until every read has happened. The barriers are cyclic, so
/// one reducer serves every iteration of a run, including back-to-back
/// rounds on the same reducer.
pub struct Reducer<T> {
    slot: Mutex<T>,
    entry: Barrier,
    exit: Barrier,
    done: Barrier,
}

impl<T: Clone> Reducer<T> {
    pub fn new(n_workers: usize, init: T) -> Self {
        Self {
            slot: Mutex::new(init),
            entry: Barrier::new(n_workers),
            exit: Barrier::new(n_workers),
            done: Barrier::new(n_workers),
        }
    }

    pub fn reduce(&self, ctx: &WorkerContext, local: T, combine: impl FnOnce(&mut T, T)) -> T {
        if ctx.is_leader() {
            *self.slot.lock().unwrap() = local;
            self.entry.wait();
        } else {
            self.entry.wait();
            let mut slot = self.slot.lock().unwrap();
            combine(&mut *slot, local);
        }
        self.exit.wait();
        let global = self.slot.lock().unwrap().clone();
        self.done.wait();
        global
    }
}

/// Shared coordination objects, allocated once before the worker pool
/// spawns: one reducer for the diagnostics block and one for the step
/// count. Nothing here grows at runtime.
pub struct ParObjects {
    pub diagnostics: Reducer<BatchStats>,
    pub step_count: Reducer<u64>,
}

impl ParObjects {
    pub fn new(n_workers: usize) -> Self {
        Self {
            diagnostics: Reducer::new(n_workers, BatchStats::default()),
            step_count: Reducer::new(n_workers, 0),
        }
    }

    /// Averaging-factor round: merges every worker's collected step count
    /// and returns this worker's share of the total.
    pub fn share_step_count(&self, ctx: &WorkerContext, local_steps: u64) -> f64 {
        let total = self.step_count.reduce(ctx, local_steps, |acc, n| *acc += n);
        local_steps as f64 / total as f64
    }
}
