use crate::distributions::DistributionKind;

/// What the training core needs to know about a policy. The network itself
/// lives behind the optimizer; diagnostics only touch the distribution, and
/// snapshots only the flattened parameters.
pub trait Policy {
    /// Recurrent policies pad trajectories and carry validity masks, which
    /// changes the entropy denominator.
    fn recurrent(&self) -> bool;

    fn distribution(&self) -> &DistributionKind;

    fn params(&self) -> Vec<f64>;
}
