//! Percentile and median pruners.
//!
//! At each step, the reporting trial's value is compared against the given
//! percentile of the values that *completed* siblings reported at the same
//! step. Running, pruned, and failed siblings are ignored: only finished
//! runs give a trustworthy picture of what a good trajectory looks like.
//!
//! # Configuration
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `percentile` | *(required)* | Keep trials in the best N%, range `(0, 100)` |
//! | `n_warmup_steps` | 0 | Skip pruning for steps below N |
//! | `n_min_trials` | 1 | Require at least N comparable siblings before pruning |

use super::Pruner;
use crate::trial::Trial;
use crate::types::{Direction, TrialState};

/// Prune trials that are not in the best `percentile`% of completed
/// siblings at the same step.
///
/// # Examples
///
/// ```
/// use hyperstudy::Direction;
/// use hyperstudy::pruner::PercentilePruner;
///
/// // Keep only the best 25% of trials (aggressive pruning)
/// let pruner = PercentilePruner::new(25.0, Direction::Minimize)
///     .n_warmup_steps(5)
///     .n_min_trials(3);
/// ```
#[derive(Clone, Debug)]
pub struct PercentilePruner {
    percentile: f64,
    n_warmup_steps: u64,
    n_min_trials: usize,
    direction: Direction,
}

impl PercentilePruner {
    /// Create a new `PercentilePruner` for the given percentile and direction.
    ///
    /// # Panics
    ///
    /// Panics if `percentile` is not in `(0.0, 100.0)`.
    #[must_use]
    pub fn new(percentile: f64, direction: Direction) -> Self {
        assert!(
            percentile > 0.0 && percentile < 100.0,
            "percentile must be in (0.0, 100.0), got {percentile}"
        );
        Self {
            percentile,
            n_warmup_steps: 0,
            n_min_trials: 1,
            direction,
        }
    }

    /// Set the number of warmup steps. No pruning occurs before this step.
    #[must_use]
    pub fn n_warmup_steps(mut self, n: u64) -> Self {
        self.n_warmup_steps = n;
        self
    }

    /// Set the minimum number of comparable siblings required before pruning.
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0.
    #[must_use]
    pub fn n_min_trials(mut self, n: usize) -> Self {
        assert!(n >= 1, "n_min_trials must be >= 1, got {n}");
        self.n_min_trials = n;
        self
    }
}

impl Pruner for PercentilePruner {
    fn should_prune(&self, trial: &Trial, step: u64, siblings: &[Trial]) -> bool {
        if step < self.n_warmup_steps {
            return false;
        }
        let Some(current) = trial.report_at(step) else {
            return false;
        };

        let mut values_at_step: Vec<f64> = siblings
            .iter()
            .filter(|t| t.state() == TrialState::Complete)
            .filter_map(|t| t.report_at(step))
            .collect();

        if values_at_step.len() < self.n_min_trials {
            return false;
        }

        // "Best p%" means the p-th percentile from the good end.
        let q = match self.direction {
            Direction::Minimize => self.percentile,
            Direction::Maximize => 100.0 - self.percentile,
        };
        let threshold = percentile(&mut values_at_step, q);

        match self.direction {
            Direction::Minimize => current > threshold,
            Direction::Maximize => current < threshold,
        }
    }
}

/// Linear-interpolated percentile of a non-empty slice. Sorts in place.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(values: &mut [f64], q: f64) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    let rank = q / 100.0 * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    values[lo] + (values[hi] - values[lo]) * frac
}

/// Prune trials that are performing worse than the median of completed
/// siblings at the same step.
///
/// Equivalent to `PercentilePruner::new(50.0, direction)`.
///
/// # Examples
///
/// ```
/// use hyperstudy::Direction;
/// use hyperstudy::pruner::MedianPruner;
///
/// // Prune trials worse than median when minimizing, after 5 warmup steps
/// let pruner = MedianPruner::new(Direction::Minimize)
///     .n_warmup_steps(5)
///     .n_min_trials(3);
/// ```
#[derive(Clone, Debug)]
pub struct MedianPruner(PercentilePruner);

impl MedianPruner {
    /// Create a new `MedianPruner` for the given optimization direction.
    ///
    /// By default, `n_warmup_steps` is 0 and `n_min_trials` is 1.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self(PercentilePruner::new(50.0, direction))
    }

    /// Set the number of warmup steps. No pruning occurs before this step.
    #[must_use]
    pub fn n_warmup_steps(self, n: u64) -> Self {
        Self(self.0.n_warmup_steps(n))
    }

    /// Set the minimum number of comparable siblings required before pruning.
    #[must_use]
    pub fn n_min_trials(self, n: usize) -> Self {
        Self(self.0.n_min_trials(n))
    }
}

impl Pruner for MedianPruner {
    fn should_prune(&self, trial: &Trial, step: u64, siblings: &[Trial]) -> bool {
        self.0.should_prune(trial, step, siblings)
    }
}
