pub mod affinity;
pub mod baselines;
pub mod diagnostics;
pub mod distributions;
pub mod logger;
pub mod optimizers;
pub mod path;
pub mod policies;
pub mod polopt;
pub mod rng;
pub mod sampler;
pub mod sync;

use anyhow::Result;

/// A learning algorithm. Currently only `ParallelBatchPolopt` implements
/// this trait.
pub trait Algorithm {
    fn train(&mut self) -> Result<()>;
}
