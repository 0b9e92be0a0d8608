use super::Pruner;
use crate::trial::Trial;

/// Prune when the value just reported falls outside fixed bounds.
///
/// Non-finite values (infinite losses from diverging training runs) are
/// always pruned. Boundary values are kept: pruning requires strictly
/// greater than `upper` or strictly less than `lower`.
///
/// # Examples
///
/// ```
/// use hyperstudy::pruner::ThresholdPruner;
///
/// let pruner = ThresholdPruner::new().upper(10.0).lower(0.0).n_warmup_steps(2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ThresholdPruner {
    lower: Option<f64>,
    upper: Option<f64>,
    n_warmup_steps: u64,
}

impl ThresholdPruner {
    /// Create a pruner with no bounds; it only prunes non-finite values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prune values strictly below `lower`.
    #[must_use]
    pub fn lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    /// Prune values strictly above `upper`.
    #[must_use]
    pub fn upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    /// Set the number of warmup steps. No pruning occurs before this step.
    #[must_use]
    pub fn n_warmup_steps(mut self, n: u64) -> Self {
        self.n_warmup_steps = n;
        self
    }
}

impl Pruner for ThresholdPruner {
    fn should_prune(&self, trial: &Trial, step: u64, _siblings: &[Trial]) -> bool {
        if step < self.n_warmup_steps {
            return false;
        }
        let Some(value) = trial.report_at(step) else {
            return false;
        };
        !value.is_finite()
            || self.upper.is_some_and(|u| value > u)
            || self.lower.is_some_and(|l| value < l)
    }
}
