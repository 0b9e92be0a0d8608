//! Pruner trait and implementations for trial pruning.
//!
//! Pruners decide whether to stop (prune) a trial early based on its
//! intermediate reports compared to other trials. The study consults its
//! pruner after every successful [`report`](crate::RunningTrial::report).
//!
//! | Pruner | Rule |
//! |--------|------|
//! | [`NopPruner`] | Never prunes (the default) |
//! | [`MedianPruner`] | Worse than the median of finished siblings at the same step |
//! | [`PercentilePruner`] | Outside the best `p`% of finished siblings at the same step |
//! | [`ThresholdPruner`] | Latest value outside fixed bounds, or not finite |

mod nop;
mod percentile;
mod threshold;

pub use nop::NopPruner;
pub use percentile::{MedianPruner, PercentilePruner};
pub use threshold::ThresholdPruner;

use crate::trial::Trial;

/// Trait for pluggable trial pruning strategies.
///
/// A pruner must be a pure function of its arguments: replaying the same
/// history must produce the same decision, which keeps studies
/// reproducible. No interior mutability, no clocks, no randomness.
///
/// The trait requires `Send + Sync` so concurrent workers can share it.
///
/// # Implementing a custom pruner
///
/// ```
/// use hyperstudy::Trial;
/// use hyperstudy::pruner::Pruner;
///
/// struct MaxSteps(u64);
///
/// impl Pruner for MaxSteps {
///     fn should_prune(&self, _trial: &Trial, step: u64, _siblings: &[Trial]) -> bool {
///         step >= self.0
///     }
/// }
/// ```
pub trait Pruner: Send + Sync {
    /// Decide whether to prune `trial` right after it reported at `step`.
    ///
    /// # Arguments
    ///
    /// * `trial` - Snapshot of the reporting trial, including the new report.
    /// * `step` - The step that was just reported.
    /// * `siblings` - Snapshots of every other trial, in any state, that has
    ///   a report at exactly `step`, in creation order.
    fn should_prune(&self, trial: &Trial, step: u64, siblings: &[Trial]) -> bool;
}
