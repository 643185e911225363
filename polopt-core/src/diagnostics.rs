use crate::distributions::Distribution;
use crate::logger::TrainLogger;
use crate::policies::Policy;
use crate::sampler::SamplesData;
use crate::sync::{ParObjects, WorkerContext};
use anyhow::Result;

/// The shared statistics block: one iteration's global batch statistics,
/// rebuilt from scratch every aggregation round. The default value is the
/// identity of `merge`.
#[derive(Clone, Debug)]
pub struct BatchStats {
    pub sum_discounted_return: f64,
    pub sum_return: f64,
    pub num_traj: u64,
    pub max_return: f64,
    pub min_return: f64,
    pub num_steps: u64,
    pub num_valids: f64,
    pub sum_entropy: f64,
}

impl Default for BatchStats {
    fn default() -> Self {
        Self {
            sum_discounted_return: 0.0,
            sum_return: 0.0,
            num_traj: 0,
            max_return: f64::NEG_INFINITY,
            min_return: f64::INFINITY,
            num_steps: 0,
            num_valids: 0.0,
            sum_entropy: 0.0,
        }
    }
}

impl BatchStats {
    /// This worker's reductions over its own batch.
    pub fn local<P: Policy>(policy: &P, samples: &SamplesData) -> Result<Self> {
        let mut stats = Self::default();
        for path in &samples.paths {
            stats.sum_discounted_return += path.returns.first().copied().unwrap_or(0.0);
            let undiscounted = path.total_reward();
            stats.sum_return += undiscounted;
            stats.max_return = stats.max_return.max(undiscounted);
            stats.min_return = stats.min_return.min(undiscounted);
            stats.num_traj += 1;
            stats.num_steps += path.len() as u64;
            let entropies = policy.distribution().entropy(&path.agent_infos)?;
            if policy.recurrent() {
                // Padded steps carry no information; mask their entropy out
                // and track the valid-step count for the denominator.
                for (i, ent) in entropies.iter().enumerate() {
                    let valid = path.valids.get(i).copied().unwrap_or(1.0);
                    stats.sum_entropy += ent * valid;
                }
                stats.num_valids += path.num_valids();
            } else {
                stats.sum_entropy += entropies.iter().sum::<f64>();
            }
        }
        Ok(stats)
    }

    /// Folds another worker's block into this one. Sums and counts add;
    /// extremes are compare-and-replace.
    pub fn merge(&mut self, other: Self) {
        self.sum_discounted_return += other.sum_discounted_return;
        self.sum_return += other.sum_return;
        self.num_traj += other.num_traj;
        self.max_return = self.max_return.max(other.max_return);
        self.min_return = self.min_return.min(other.min_return);
        self.num_steps += other.num_steps;
        self.num_valids += other.num_valids;
        self.sum_entropy += other.sum_entropy;
    }

    pub fn average_discounted_return(&self) -> f64 {
        self.sum_discounted_return / self.num_traj as f64
    }

    pub fn average_return(&self) -> f64 {
        self.sum_return / self.num_traj as f64
    }

    /// Mean entropy. Recurrent policies divide by the number of valid
    /// steps, everything else by the total step count; the wrong
    /// denominator silently biases entropy and perplexity.
    pub fn mean_entropy(&self, recurrent: bool) -> f64 {
        let denom = if recurrent {
            self.num_valids
        } else {
            self.num_steps as f64
        };
        self.sum_entropy / denom
    }
}

/// Diagnostics round for one iteration: reduce the local statistics across
/// all workers, then the leader alone records the tabular row. Every worker
/// must call this exactly once per iteration or the barriers deadlock.
pub fn log_diagnostics<P: Policy>(
    itr: usize,
    ctx: &WorkerContext,
    policy: &P,
    samples: &SamplesData,
    par: &ParObjects,
    logger: &dyn TrainLogger,
) -> Result<()> {
    let local = BatchStats::local(policy, samples)?;
    let global = par.diagnostics.reduce(ctx, local, |acc, other| acc.merge(other));
    if ctx.is_leader() {
        let entropy = global.mean_entropy(policy.recurrent());
        logger.record_tabular("Iteration", itr as f64);
        logger.record_tabular("AverageDiscountedReturn", global.average_discounted_return());
        logger.record_tabular("AverageReturn", global.average_return());
        logger.record_tabular("NumTrajs", global.num_traj as f64);
        logger.record_tabular("Entropy", entropy);
        logger.record_tabular("Perplexity", entropy.exp());
        logger.record_tabular("MaxReturn", global.max_return);
        logger.record_tabular("MinReturn", global.min_return);
    }
    Ok(())
}
