//! Core types for the study engine.

use serde::{Deserialize, Serialize};

/// The direction of optimization for one objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Minimize the objective value.
    Minimize,
    /// Maximize the objective value.
    Maximize,
}

impl Direction {
    /// Map `value` onto a "higher is better" scale.
    #[must_use]
    pub fn orient(self, value: f64) -> f64 {
        match self {
            Direction::Minimize => -value,
            Direction::Maximize => value,
        }
    }

    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    #[must_use]
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        self.orient(candidate) > self.orient(incumbent)
    }
}

/// The state of a trial in its lifecycle.
///
/// `Running` is the only initial state. Every other state is terminal and
/// is entered exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialState {
    /// The trial is being evaluated.
    Running,
    /// The objective returned its final values.
    Complete,
    /// The pruner stopped the trial early.
    Pruned,
    /// The objective itself errored.
    Failed,
    /// The study shut down while the trial was still running.
    Abandoned,
}

impl TrialState {
    /// Returns `true` for every state except [`Running`](TrialState::Running).
    #[must_use]
    pub fn is_finished(self) -> bool {
        self != TrialState::Running
    }
}
