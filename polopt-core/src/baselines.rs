use crate::path::Path;
use anyhow::Result;

/// Value-function baseline. Fitting runs on every worker with that worker's
/// own paths each iteration; implementations that merge statistics across
/// workers must do so internally and stay safe to call without outside
/// coordination.
pub trait Baseline {
    /// Called on every worker's baseline before the pool spawns.
    fn init_par_objs(&mut self, n_parallel: usize);

    fn set_rank(&mut self, rank: usize);

    /// Value estimate for every step of the path.
    fn predict(&self, path: &Path) -> Vec<f64>;

    fn fit(&mut self, paths: &[Path]) -> Result<()>;

    fn params(&self) -> Vec<f64>;
}
