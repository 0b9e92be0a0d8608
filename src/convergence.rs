//! Best-so-far convergence tracking for single-objective studies.

use crate::trial::Trial;
use crate::types::{Direction, TrialState};

/// Incrementally tracks the running best objective value.
///
/// # Examples
///
/// ```
/// use hyperstudy::Direction;
/// use hyperstudy::convergence::ConvergenceTracker;
///
/// let mut tracker = ConvergenceTracker::new(Direction::Minimize);
/// assert_eq!(tracker.observe(5.0), 5.0);
/// assert_eq!(tracker.observe(2.0), 2.0);
/// assert_eq!(tracker.observe(8.0), 2.0);
/// assert_eq!(tracker.series(), &[5.0, 2.0, 2.0]);
/// ```
#[derive(Clone, Debug)]
pub struct ConvergenceTracker {
    direction: Direction,
    best: Option<f64>,
    series: Vec<f64>,
}

impl ConvergenceTracker {
    /// Create an empty tracker for the given direction.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            best: None,
            series: Vec::new(),
        }
    }

    /// Record one completed value and return the best value so far.
    pub fn observe(&mut self, value: f64) -> f64 {
        let best = match self.best {
            Some(b) if !self.direction.is_better(value, b) => b,
            _ => value,
        };
        self.best = Some(best);
        self.series.push(best);
        best
    }

    /// Feed a trial; only `Complete` trials affect the series.
    ///
    /// Returns the updated best value, or `None` if the trial was skipped.
    pub fn observe_trial(&mut self, trial: &Trial) -> Option<f64> {
        if trial.state() != TrialState::Complete {
            return None;
        }
        trial.value().map(|v| self.observe(v))
    }

    /// The best value seen so far.
    #[must_use]
    pub fn best(&self) -> Option<f64> {
        self.best
    }

    /// One best-so-far entry per observed value.
    #[must_use]
    pub fn series(&self) -> &[f64] {
        &self.series
    }

    /// Consume the tracker, returning the series.
    #[must_use]
    pub fn into_series(self) -> Vec<f64> {
        self.series
    }
}

/// The best-so-far series over the `Complete` trials in creation order.
///
/// Pruned, failed, abandoned, and running trials are skipped: they neither
/// appear in the series nor affect the running best. Empty input yields an
/// empty series.
#[must_use]
pub fn convergence_series(trials: &[Trial], direction: Direction) -> Vec<f64> {
    let mut ordered: Vec<&Trial> = trials.iter().collect();
    ordered.sort_by_key(|t| t.id());

    let mut tracker = ConvergenceTracker::new(direction);
    for trial in ordered {
        tracker.observe_trial(trial);
    }
    tracker.into_series()
}
