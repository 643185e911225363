use super::Distribution;
use crate::path::AgentInfo;
use anyhow::{Result, bail};

/// Discrete action distribution. Entropy is computed from the per-step
/// probability vectors the policy reported while sampling.
#[derive(Clone, Debug, Default)]
pub struct CategoricalDistribution;

impl Distribution for CategoricalDistribution {
    fn entropy(&self, agent_infos: &[AgentInfo]) -> Result<Vec<f64>> {
        agent_infos
            .iter()
            .map(|info| {
                let AgentInfo::Categorical { probs } = info else {
                    bail!("categorical policy produced non-categorical agent info")
                };
                Ok(-probs
                    .iter()
                    .filter(|p| **p > 0.0)
                    .map(|p| p * p.ln())
                    .sum::<f64>())
            })
            .collect()
    }
}
