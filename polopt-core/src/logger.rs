use crate::path::Path;
use anyhow::{Context, Result};
use bincode::{Decode, Encode};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Leader-only artifact: everything worth persisting about one iteration.
/// Built once after the optimization step and never mutated afterwards.
#[derive(Clone, Debug, Encode, Decode)]
pub struct IterationSnapshot {
    pub itr: u64,
    pub policy_params: Vec<f64>,
    pub baseline_params: Vec<f64>,
    pub paths: Option<Vec<Path>>,
}

/// Sink for the leader's output. Only rank 0 ever calls these methods, but
/// the same sink is visible from every worker thread, hence `Sync`.
pub trait TrainLogger: Sync {
    fn log(&self, msg: &str);

    fn record_tabular(&self, key: &str, value: f64);

    /// Emits the buffered tabular row and clears it.
    fn dump_tabular(&self);

    fn save_itr_params(&self, itr: usize, snapshot: &IterationSnapshot) -> Result<()>;
}

/// Default logger: progress messages on the `log` facade, tabular rows
/// buffered and dumped as one line per iteration, snapshots bincode-encoded
/// into a directory when one is configured.
#[derive(Default)]
pub struct StdTrainLogger {
    rows: Mutex<Vec<(String, f64)>>,
    snapshot_dir: Option<PathBuf>,
}

impl StdTrainLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            snapshot_dir: Some(dir.into()),
        }
    }
}

impl TrainLogger for StdTrainLogger {
    fn log(&self, msg: &str) {
        log::info!("{msg}");
    }

    fn record_tabular(&self, key: &str, value: f64) {
        self.rows.lock().unwrap().push((key.to_string(), value));
    }

    fn dump_tabular(&self) {
        let mut rows = self.rows.lock().unwrap();
        let line = rows
            .iter()
            .map(|(key, value)| format!("{key}: {value:.6}"))
            .collect::<Vec<_>>()
            .join("  ");
        log::info!("{line}");
        rows.clear();
    }

    fn save_itr_params(&self, itr: usize, snapshot: &IterationSnapshot) -> Result<()> {
        let Some(dir) = &self.snapshot_dir else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;
        let bytes = bincode::encode_to_vec(snapshot, bincode::config::standard())?;
        let file = dir.join(format!("itr_{itr}.bin"));
        fs::write(&file, bytes).with_context(|| format!("writing snapshot {}", file.display()))?;
        Ok(())
    }
}

/// Reads back a snapshot written by `StdTrainLogger`.
pub fn load_itr_params(file: &std::path::Path) -> Result<IterationSnapshot> {
    let bytes = fs::read(file).with_context(|| format!("reading snapshot {}", file.display()))?;
    let (snapshot, _) = bincode::decode_from_slice(&bytes, bincode::config::standard())?;
    Ok(snapshot)
}
