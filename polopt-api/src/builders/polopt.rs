use anyhow::{Result, ensure};
use polopt_core::baselines::Baseline;
use polopt_core::logger::TrainLogger;
use polopt_core::optimizers::PolicyOptimizer;
use polopt_core::policies::Policy;
use polopt_core::polopt::{ParallelBatchPolopt, PoloptConfig, Worker};
use polopt_core::sampler::Sampler;

/// Builder around `PoloptConfig` with the serial batch-polopt defaults:
/// 500 iterations of 5000-step batches, discount 0.99, one worker.
#[derive(Default)]
pub struct ParallelBatchPoloptBuilder {
    pub config: PoloptConfig,
}

impl ParallelBatchPoloptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_n_itr(&mut self, n_itr: usize) {
        self.config.n_itr = n_itr;
    }

    pub fn set_start_itr(&mut self, start_itr: usize) {
        self.config.start_itr = start_itr;
    }

    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.config.batch_size = batch_size;
    }

    pub fn set_max_path_length(&mut self, max_path_length: usize) {
        self.config.max_path_length = max_path_length;
    }

    pub fn set_discount(&mut self, discount: f64) {
        self.config.discount = discount;
    }

    pub fn set_gae_lambda(&mut self, gae_lambda: f64) {
        self.config.gae_lambda = gae_lambda;
    }

    pub fn set_store_paths(&mut self, store_paths: bool) {
        self.config.store_paths = store_paths;
    }

    pub fn set_whole_paths(&mut self, whole_paths: bool) {
        self.config.whole_paths = whole_paths;
    }

    pub fn set_n_parallel(&mut self, n_parallel: usize) {
        self.config.n_parallel = n_parallel;
    }

    pub fn set_cpu_assignments(&mut self, cpu_assignments: Vec<usize>) {
        self.config.cpu_assignments = Some(cpu_assignments);
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = seed;
    }

    pub fn build<S, P, B, O, L>(
        self,
        workers: Vec<Worker<S, P, B, O>>,
        logger: L,
    ) -> Result<ParallelBatchPolopt<S, P, B, O, L>>
    where
        S: Sampler,
        P: Policy,
        B: Baseline,
        O: PolicyOptimizer,
        L: TrainLogger,
    {
        ensure!(
            workers.len() == self.config.n_parallel,
            "builder configured for {} workers but {} were provided",
            self.config.n_parallel,
            workers.len()
        );
        Ok(ParallelBatchPolopt {
            config: self.config,
            workers,
            logger,
        })
    }
}
