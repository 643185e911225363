use anyhow::Result;
use crossbeam::channel::{Receiver, Sender, unbounded};
use polopt_core::baselines::Baseline;
use polopt_core::distributions::{DistributionKind, categorical::CategoricalDistribution};
use polopt_core::logger::{IterationSnapshot, TrainLogger};
use polopt_core::optimizers::PolicyOptimizer;
use polopt_core::path::{
    AgentInfo, Path, center_advantages, discount_cumsum, gae_advantages,
    shift_advantages_to_positive, truncate_paths,
};
use polopt_core::policies::Policy;
use polopt_core::polopt::PoloptConfig;
use polopt_core::sampler::{DiagnosticsData, Sampler, SamplesData};

/// Sampler that replays pre-baked reward sequences: one `Vec<Vec<f64>>` per
/// iteration (outer index cycles), one inner vector per trajectory. Real
/// steps report uniform categorical probabilities; when `pad_to` is set,
/// trajectories are padded to that length with zero-reward, zero-entropy,
/// invalid steps, the shape recurrent policies see.
pub struct ScriptedSampler {
    pub episodes: Vec<Vec<Vec<f64>>>,
    pub n_actions: usize,
    pub discount: f64,
    pub gae_lambda: f64,
    pub center_adv: bool,
    pub positive_adv: bool,
    pub max_path_length: usize,
    /// Fixed-length sampling budget; `None` keeps whole paths.
    pub max_steps: Option<usize>,
    pub pad_to: Option<usize>,
    /// Makes `obtain_samples` fail at the given iteration.
    pub fail_at_itr: Option<usize>,
}

impl ScriptedSampler {
    pub fn new(episodes: Vec<Vec<Vec<f64>>>) -> Self {
        Self {
            episodes,
            n_actions: 2,
            discount: 0.99,
            gae_lambda: 1.0,
            center_adv: false,
            positive_adv: false,
            max_path_length: usize::MAX,
            max_steps: None,
            pad_to: None,
            fail_at_itr: None,
        }
    }

    /// Wires the sampling-side knobs the algorithm config carries, the way
    /// the serial algorithm hands them to its own sampler.
    pub fn from_config(config: &PoloptConfig, episodes: Vec<Vec<Vec<f64>>>) -> Self {
        let mut sampler = Self::new(episodes);
        sampler.discount = config.discount;
        sampler.gae_lambda = config.gae_lambda;
        sampler.center_adv = config.center_adv;
        sampler.positive_adv = config.positive_adv;
        sampler.max_path_length = config.max_path_length;
        if !config.whole_paths {
            sampler.max_steps = Some(config.worker_batch_size());
        }
        sampler
    }
}

impl Sampler for ScriptedSampler {
    fn obtain_samples(&mut self, itr: usize) -> Result<(Vec<Path>, u64)> {
        if self.fail_at_itr == Some(itr) {
            anyhow::bail!("scripted sampling failure at iteration {itr}");
        }
        let episode = &self.episodes[itr % self.episodes.len()];
        let uniform = vec![1.0 / self.n_actions as f64; self.n_actions];
        let mut degenerate = vec![0.0; self.n_actions];
        degenerate[0] = 1.0;
        let mut paths = Vec::with_capacity(episode.len());
        let mut steps = 0u64;
        for rewards in episode {
            let mut path = Path::default();
            for reward in rewards.iter().take(self.max_path_length) {
                path.push_step(*reward, AgentInfo::Categorical {
                    probs: uniform.clone(),
                });
            }
            if let Some(pad_to) = self.pad_to {
                path.valids = vec![1.0; path.len()];
                while path.len() < pad_to {
                    path.push_step(0.0, AgentInfo::Categorical {
                        probs: degenerate.clone(),
                    });
                    path.valids.push(0.0);
                }
            }
            paths.push(path);
        }
        if let Some(max_steps) = self.max_steps {
            paths = truncate_paths(paths, max_steps);
        }
        for path in &paths {
            steps += path.len() as u64;
        }
        Ok((paths, steps))
    }

    fn process_samples(
        &mut self,
        _itr: usize,
        mut paths: Vec<Path>,
    ) -> Result<(SamplesData, DiagnosticsData)> {
        let mut dgnstc = DiagnosticsData::default();
        for path in &mut paths {
            path.returns = discount_cumsum(&path.rewards, self.discount);
            let baselines = vec![0.0; path.len()];
            path.advantages =
                gae_advantages(&path.rewards, &baselines, self.discount, self.gae_lambda);
            if self.center_adv {
                center_advantages(&mut path.advantages);
            }
            if self.positive_adv {
                shift_advantages_to_positive(&mut path.advantages);
            }
            dgnstc.baselines.push(baselines);
            dgnstc.returns.push(path.returns.clone());
        }
        Ok((SamplesData { paths }, dgnstc))
    }
}

/// Policy with a fixed categorical distribution and constant parameters.
pub struct FixedPolicy {
    pub recurrent: bool,
    pub params: Vec<f64>,
    distribution: DistributionKind,
}

impl FixedPolicy {
    pub fn new(recurrent: bool) -> Self {
        Self {
            recurrent,
            params: vec![0.5, -0.5],
            distribution: DistributionKind::Categorical(CategoricalDistribution),
        }
    }
}

impl Policy for FixedPolicy {
    fn recurrent(&self) -> bool {
        self.recurrent
    }

    fn distribution(&self) -> &DistributionKind {
        &self.distribution
    }

    fn params(&self) -> Vec<f64> {
        self.params.clone()
    }
}

/// Baseline that predicts zero and counts how it was driven.
#[derive(Default)]
pub struct CountingBaseline {
    pub rank: Option<usize>,
    pub n_parallel: Option<usize>,
    pub fit_calls: usize,
}

impl Baseline for CountingBaseline {
    fn init_par_objs(&mut self, n_parallel: usize) {
        self.n_parallel = Some(n_parallel);
    }

    fn set_rank(&mut self, rank: usize) {
        self.rank = Some(rank);
    }

    fn predict(&self, path: &Path) -> Vec<f64> {
        vec![0.0; path.len()]
    }

    fn fit(&mut self, _paths: &[Path]) -> Result<()> {
        self.fit_calls += 1;
        Ok(())
    }

    fn params(&self) -> Vec<f64> {
        vec![self.fit_calls as f64]
    }
}

/// Optimizer that records every averaging factor pushed into it.
#[derive(Default)]
pub struct RecordingOptimizer {
    pub rank: Option<usize>,
    pub avg_facs: Vec<f64>,
    pub optimize_calls: usize,
}

impl PolicyOptimizer for RecordingOptimizer {
    fn set_rank(&mut self, rank: usize) {
        self.rank = Some(rank);
    }

    fn set_avg_fac(&mut self, avg_fac: f64) {
        self.avg_facs.push(avg_fac);
    }

    fn optimize(&mut self, _itr: usize, _samples: &SamplesData) -> Result<()> {
        self.optimize_calls += 1;
        Ok(())
    }
}

/// Everything the leader emitted during a run, drained over a channel so
/// tests can assert on it after `train` returns.
#[derive(Clone, Debug)]
pub enum LogEvent {
    Message(String),
    Tabular(String, f64),
    Dump,
    Snapshot(IterationSnapshot),
}

pub struct RecordingLogger {
    tx: Sender<LogEvent>,
}

impl RecordingLogger {
    pub fn new() -> (Self, Receiver<LogEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl TrainLogger for RecordingLogger {
    fn log(&self, msg: &str) {
        self.tx.send(LogEvent::Message(msg.to_string())).unwrap();
    }

    fn record_tabular(&self, key: &str, value: f64) {
        self.tx
            .send(LogEvent::Tabular(key.to_string(), value))
            .unwrap();
    }

    fn dump_tabular(&self) {
        self.tx.send(LogEvent::Dump).unwrap();
    }

    fn save_itr_params(&self, _itr: usize, snapshot: &IterationSnapshot) -> Result<()> {
        self.tx.send(LogEvent::Snapshot(snapshot.clone())).unwrap();
        Ok(())
    }
}

/// Pulls the value recorded for `key` in iteration order.
pub fn tabular_values(events: &[LogEvent], key: &str) -> Vec<f64> {
    events
        .iter()
        .filter_map(|event| match event {
            LogEvent::Tabular(k, v) if k == key => Some(*v),
            _ => None,
        })
        .collect()
}
