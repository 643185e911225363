use crate::{
    Algorithm,
    affinity::{assigned_cpu, check_cpu, pin_to_cpu},
    baselines::Baseline,
    diagnostics::log_diagnostics,
    logger::{IterationSnapshot, TrainLogger},
    optimizers::PolicyOptimizer,
    policies::Policy,
    rng,
    sampler::{Sampler, SamplesData},
    sync::{ParObjects, WorkerContext},
};
use anyhow::{Result, anyhow, ensure};
use std::thread;

/// Training-loop configuration. Defaults mirror the serial batch-polopt
/// settings except `whole_paths`, which defaults off so each worker's batch
/// stays near `batch_size / n_parallel` steps.
#[derive(Clone, Debug)]
pub struct PoloptConfig {
    pub n_itr: usize,
    pub start_itr: usize,
    pub batch_size: usize,
    pub max_path_length: usize,
    pub discount: f64,
    pub gae_lambda: f64,
    pub center_adv: bool,
    pub positive_adv: bool,
    pub store_paths: bool,
    pub whole_paths: bool,
    pub n_parallel: usize,
    pub cpu_assignments: Option<Vec<usize>>,
    pub seed: u64,
}

impl Default for PoloptConfig {
    fn default() -> Self {
        Self {
            n_itr: 500,
            start_itr: 0,
            batch_size: 5000,
            max_path_length: 500,
            discount: 0.99,
            gae_lambda: 1.0,
            center_adv: true,
            positive_adv: false,
            store_paths: false,
            whole_paths: false,
            n_parallel: 1,
            cpu_assignments: None,
            seed: 1,
        }
    }
}

impl PoloptConfig {
    /// Per-worker step target: the batch split evenly across workers.
    pub fn worker_batch_size(&self) -> usize {
        self.batch_size / self.n_parallel
    }
}

/// One worker's private collaborators. Every worker owns an identical,
/// independent set, the moral equivalent of the state a forked sampling
/// process would have copied.
pub struct Worker<S, P, B, O> {
    pub sampler: S,
    pub policy: P,
    pub baseline: B,
    pub optimizer: O,
}

/// Parallelized batch sampling-based policy optimization: a fixed pool of
/// workers, one OS thread per rank, spawned once and joined at the end of
/// the run. Workers coordinate only through two barrier-paired reduce
/// rounds per iteration (step counts, then diagnostics); everything else
/// runs on worker-local state. Rank 0 is the leader and alone logs and
/// persists snapshots.
///
/// There is no explicit end-of-iteration barrier: the next iteration's
/// step-count round already keeps workers within one phase of each other,
/// so optimizer and baseline implementations must be safe to call without
/// extra coordination, exactly like the collaborator contracts say.
pub struct ParallelBatchPolopt<S, P, B, O, L> {
    pub config: PoloptConfig,
    pub workers: Vec<Worker<S, P, B, O>>,
    pub logger: L,
}

impl<S, P, B, O, L> Algorithm for ParallelBatchPolopt<S, P, B, O, L>
where
    S: Sampler + Send,
    P: Policy + Send,
    B: Baseline + Send,
    O: PolicyOptimizer + Send,
    L: TrainLogger,
{
    fn train(&mut self) -> Result<()> {
        let config = &self.config;
        ensure!(config.n_parallel >= 1, "n_parallel must be at least 1");
        ensure!(
            self.workers.len() == config.n_parallel,
            "expected {} workers, got {}",
            config.n_parallel,
            self.workers.len()
        );
        // Bad CPU assignments fail here, before any worker can park at a
        // barrier its failed partner would never reach.
        for rank in 0..config.n_parallel {
            check_cpu(assigned_cpu(rank, config.cpu_assignments.as_deref()))?;
        }
        for worker in &mut self.workers {
            worker.baseline.init_par_objs(config.n_parallel);
        }
        // Allocated once, before any worker starts.
        let par = ParObjects::new(config.n_parallel);
        let logger = &self.logger;
        let results: Vec<Result<()>> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .workers
                .iter_mut()
                .enumerate()
                .map(|(rank, worker)| {
                    let par = &par;
                    scope.spawn(move || run_worker(rank, config, worker, par, logger))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(res) => res,
                    Err(_) => Err(anyhow!("worker thread panicked")),
                })
                .collect()
        });
        for res in results {
            res?;
        }
        Ok(())
    }
}

/// The per-worker training loop. Phases run in strict order every
/// iteration; the two reduce calls are the only cross-worker touch points,
/// so a worker bailing out mid-run leaves the rest parked at the next
/// barrier. The pool is fixed, trusted, and single-machine, so that stall
/// is accepted, but the cause is logged here first so it is never silent.
fn run_worker<S, P, B, O, L>(
    rank: usize,
    config: &PoloptConfig,
    worker: &mut Worker<S, P, B, O>,
    par: &ParObjects,
    logger: &L,
) -> Result<()>
where
    S: Sampler,
    P: Policy,
    B: Baseline,
    O: PolicyOptimizer,
    L: TrainLogger,
{
    let res = worker_loop(rank, config, worker, par, logger);
    if let Err(err) = &res {
        log::error!("worker {rank} failed: {err:#}");
    }
    res
}

fn worker_loop<S, P, B, O, L>(
    rank: usize,
    config: &PoloptConfig,
    worker: &mut Worker<S, P, B, O>,
    par: &ParObjects,
    logger: &L,
) -> Result<()>
where
    S: Sampler,
    P: Policy,
    B: Baseline,
    O: PolicyOptimizer,
    L: TrainLogger,
{
    let mut ctx = WorkerContext::new(rank, config.n_parallel);
    pin_to_cpu(assigned_cpu(rank, config.cpu_assignments.as_deref()))?;
    rng::set_seed(config.seed + rank as u64);
    worker.baseline.set_rank(rank);
    worker.optimizer.set_rank(rank);

    for itr in config.start_itr..config.n_itr {
        let (paths, n_steps_collected) = worker.sampler.obtain_samples(itr)?;
        ctx.avg_fac = par.share_step_count(&ctx, n_steps_collected);
        worker.optimizer.set_avg_fac(ctx.avg_fac);
        let (samples, _dgnstc) = worker.sampler.process_samples(itr, paths)?;
        log_diagnostics(itr, &ctx, &worker.policy, &samples, par, logger)?;
        worker.optimizer.optimize(itr, &samples)?;
        if ctx.is_leader() {
            logger.log("fitting baseline...");
        }
        worker.baseline.fit(&samples.paths)?;
        if ctx.is_leader() {
            checkpoint(itr, config, worker, &samples, logger)?;
        }
    }
    Ok(())
}

/// Leader hook: everything only rank 0 does at the end of an iteration, in
/// one place so the main loop stays free of per-line rank checks.
fn checkpoint<S, P, B, O, L>(
    itr: usize,
    config: &PoloptConfig,
    worker: &Worker<S, P, B, O>,
    samples: &SamplesData,
    logger: &L,
) -> Result<()>
where
    P: Policy,
    B: Baseline,
    L: TrainLogger,
{
    logger.log("saving snapshot...");
    let snapshot = IterationSnapshot {
        itr: itr as u64,
        policy_params: worker.policy.params(),
        baseline_params: worker.baseline.params(),
        // Only the leader's own paths end up in the snapshot.
        paths: config.store_paths.then(|| samples.paths.clone()),
    };
    logger.save_itr_params(itr, &snapshot)?;
    logger.log("saved");
    logger.dump_tabular();
    Ok(())
}
