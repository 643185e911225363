use bincode::{Decode, Encode};

/// Per-step policy outputs needed for entropy diagnostics.
#[derive(Clone, Debug, Encode, Decode)]
pub enum AgentInfo {
    Categorical { probs: Vec<f64> },
    DiagGaussian { mean: Vec<f64>, log_std: Vec<f64> },
}

/// One sampled trajectory. Rewards and agent infos come from the sampler;
/// returns and advantages are filled in by `process_samples`. An empty
/// `valids` vector means every step is valid; recurrent policies pad
/// trajectories to a common length and mask the padding with zeros.
#[derive(Clone, Debug, Default, Encode, Decode)]
pub struct Path {
    pub rewards: Vec<f64>,
    pub returns: Vec<f64>,
    pub advantages: Vec<f64>,
    pub valids: Vec<f64>,
    pub agent_infos: Vec<AgentInfo>,
}

impl Path {
    pub fn push_step(&mut self, reward: f64, agent_info: AgentInfo) {
        self.rewards.push(reward);
        self.agent_infos.push(agent_info);
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Undiscounted return of the whole trajectory.
    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }

    pub fn num_valids(&self) -> f64 {
        if self.valids.is_empty() {
            self.len() as f64
        } else {
            self.valids.iter().sum()
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.rewards.truncate(len);
        self.returns.truncate(len);
        self.advantages.truncate(len);
        self.valids.truncate(len);
        self.agent_infos.truncate(len);
    }
}

/// Discounted reward-to-go for every step. Index 0 is the trajectory's
/// discounted return.
pub fn discount_cumsum(rewards: &[f64], discount: f64) -> Vec<f64> {
    let mut out = vec![0.0; rewards.len()];
    let mut running = 0.0;
    for i in (0..rewards.len()).rev() {
        running = rewards[i] + discount * running;
        out[i] = running;
    }
    out
}

/// Generalized advantage estimation over a single trajectory. `baselines`
/// holds one value estimate per step; the value after the final step is
/// taken as zero since trajectories end at termination or truncation.
pub fn gae_advantages(
    rewards: &[f64],
    baselines: &[f64],
    discount: f64,
    gae_lambda: f64,
) -> Vec<f64> {
    let total_steps = rewards.len();
    let mut advantages = vec![0.0; total_steps];
    let mut last_gae = 0.0;
    for i in (0..total_steps).rev() {
        let next_value = if i + 1 < total_steps {
            baselines[i + 1]
        } else {
            0.0
        };
        let delta = rewards[i] + discount * next_value - baselines[i];
        last_gae = delta + discount * gae_lambda * last_gae;
        advantages[i] = last_gae;
    }
    advantages
}

/// Rescales advantages to mean 0 and standard deviation 1.
pub fn center_advantages(advantages: &mut [f64]) {
    let mean = advantages.iter().sum::<f64>() / advantages.len() as f64;
    let variance =
        advantages.iter().map(|x| (*x - mean).powi(2)).sum::<f64>() / advantages.len() as f64;
    let std = variance.sqrt() + 1e-8;
    for x in advantages.iter_mut() {
        *x = (*x - mean) / std;
    }
}

/// Shifts advantages so the smallest one sits just above zero.
pub fn shift_advantages_to_positive(advantages: &mut [f64]) {
    let min = advantages.iter().cloned().fold(f64::INFINITY, f64::min);
    for x in advantages.iter_mut() {
        *x = *x - min + 1e-8;
    }
}

/// Drops whole trailing paths while the rest still covers the budget, then
/// trims the last kept path so the total step count fits exactly. Used by
/// fixed-length sampling; whole-path sampling skips this.
pub fn truncate_paths(mut paths: Vec<Path>, max_steps: usize) -> Vec<Path> {
    let mut total: usize = paths.iter().map(Path::len).sum();
    while let Some(last) = paths.last() {
        if total - last.len() >= max_steps {
            total -= last.len();
            paths.pop();
        } else {
            break;
        }
    }
    if total > max_steps {
        if let Some(last) = paths.last_mut() {
            let keep = last.len() - (total - max_steps);
            last.truncate(keep);
        }
    }
    paths
}
