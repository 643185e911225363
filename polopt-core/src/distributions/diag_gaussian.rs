use super::Distribution;
use crate::path::AgentInfo;
use anyhow::{Result, bail};
use std::f64::consts::PI;

/// Gaussian with a diagonal covariance. Entropy depends only on the
/// per-dimension log standard deviations.
#[derive(Clone, Debug, Default)]
pub struct DiagGaussianDistribution;

impl Distribution for DiagGaussianDistribution {
    fn entropy(&self, agent_infos: &[AgentInfo]) -> Result<Vec<f64>> {
        let half_log_2pi_e = 0.5 * (1.0 + (2.0 * PI).ln());
        agent_infos
            .iter()
            .map(|info| {
                let AgentInfo::DiagGaussian { log_std, .. } = info else {
                    bail!("gaussian policy produced non-gaussian agent info")
                };
                Ok(log_std.iter().map(|ls| ls + half_log_2pi_e).sum())
            })
            .collect()
    }
}
