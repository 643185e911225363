use crate::sampler::SamplesData;
use anyhow::Result;

/// Policy optimizer contract. The loop pushes the rank in once at startup
/// and the averaging factor before every `optimize` call; how gradients get
/// merged across workers is the implementation's own business.
pub trait PolicyOptimizer {
    fn set_rank(&mut self, rank: usize);

    /// This worker's share of the iteration's total environment steps.
    fn set_avg_fac(&mut self, avg_fac: f64);

    fn optimize(&mut self, itr: usize, samples: &SamplesData) -> Result<()>;
}
