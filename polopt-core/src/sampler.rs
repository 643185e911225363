use crate::path::Path;
use anyhow::Result;

/// Processed batch handed to diagnostics and the optimizer.
#[derive(Clone, Debug, Default)]
pub struct SamplesData {
    pub paths: Vec<Path>,
}

/// Per-path baseline predictions and empirical returns. Kept around as an
/// extension point for an explained-variance diagnostic; nothing aggregates
/// these across workers yet.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticsData {
    pub baselines: Vec<Vec<f64>>,
    pub returns: Vec<Vec<f64>>,
}

pub trait Sampler {
    /// Collects this worker's share of the iteration's batch. Returns the
    /// paths plus the number of environment steps actually collected, which
    /// may land above or below the per-worker target depending on whether
    /// whole paths are kept or the batch is truncated to a fixed length.
    fn obtain_samples(&mut self, itr: usize) -> Result<(Vec<Path>, u64)>;

    /// Fills in returns and advantages for the worker's own paths. Runs
    /// without any cross-worker coordination.
    fn process_samples(&mut self, itr: usize, paths: Vec<Path>)
    -> Result<(SamplesData, DiagnosticsData)>;
}
