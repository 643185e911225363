pub mod categorical;
pub mod diag_gaussian;

use crate::path::AgentInfo;
use anyhow::Result;
use categorical::CategoricalDistribution;
use diag_gaussian::DiagGaussianDistribution;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
pub trait Distribution {
    /// Per-step policy entropy, one value per agent info record. An agent
    /// info of the wrong variant means the policy was misassembled, which
    /// is an error, not a panic.
    fn entropy(&self, agent_infos: &[AgentInfo]) -> Result<Vec<f64>>;
}

#[enum_dispatch(Distribution)]
pub enum DistributionKind {
    Categorical(CategoricalDistribution),
    DiagGaussian(DiagGaussianDistribution),
}
