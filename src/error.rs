use crate::types::{Direction, TrialState};

/// Errors returned by study, trial, and storage operations.
///
/// Every variant describes a local, recoverable condition. None of them
/// leaves the [`Study`](crate::Study) in an unusable state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when an operation requires a trial state the trial is not in.
    #[error("trial {trial_id} is {state:?}; cannot {operation}")]
    InvalidState {
        /// The trial the operation targeted.
        trial_id: u64,
        /// The state the trial was in.
        state: TrialState,
        /// The rejected operation (`"report"`, `"complete"`, ...).
        operation: &'static str,
    },

    /// Returned when an intermediate report does not advance the step.
    #[error("trial {trial_id}: step {step} must be greater than the last reported step {last_step}")]
    NonMonotonicStep {
        /// The reporting trial.
        trial_id: u64,
        /// The rejected step.
        step: u64,
        /// The last step already recorded.
        last_step: u64,
    },

    /// Returned when a trial is completed with the wrong number of values.
    #[error("objective value count mismatch: expected {expected} values, got {got}")]
    ValueCountMismatch {
        /// The study's objective count.
        expected: usize,
        /// The number of values supplied.
        got: usize,
    },

    /// Returned when a parameter assignment violates the search space.
    #[error("parameter constraint violated for '{name}': {reason}")]
    ParameterConstraint {
        /// The offending parameter name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Returned when a persisted study does not exist.
    #[error("study '{0}' not found")]
    NotFound(String),

    /// Returned when a trial id does not belong to the study.
    #[error("unknown trial id {0}")]
    UnknownTrial(u64),

    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low must be positive for log scale")]
    InvalidLogBounds,

    /// Returned when step size is not positive.
    #[error("invalid step: step must be positive")]
    InvalidStep,

    /// Returned when categorical choices are empty.
    #[error("categorical choices cannot be empty")]
    EmptyChoices,

    /// Returned when a reported or final value is NaN.
    #[error("invalid objective value: {0}")]
    InvalidValue(f64),

    /// Returned when requesting the best trial but no trials have completed.
    #[error("no completed trials available")]
    NoCompletedTrials,

    /// Returned when a single-objective view is requested on a multi-objective study.
    #[error("operation requires a single-objective study, this one has {0} objectives")]
    SingleObjectiveOnly(usize),

    /// Returned when the Pareto front is requested on a single-objective study.
    #[error("operation requires a multi-objective study")]
    MultiObjectiveOnly,

    /// Returned when a study is built without any objective direction.
    #[error("a study needs at least one objective direction")]
    EmptyDirections,

    /// Returned when a resumed study is configured with different directions
    /// than the ones it was saved with.
    #[error("study was saved with directions {stored:?}, requested {requested:?}")]
    DirectionMismatch {
        /// The persisted directions.
        stored: Vec<Direction>,
        /// The directions the builder asked for.
        requested: Vec<Direction>,
    },

    /// Returned when `save` is called on a study without a persistence store.
    #[error("study '{0}' has no persistence store")]
    NoStore(String),

    /// Returned when a run budget bounds neither trial count nor time.
    #[error("run budget must bound the number of trials or the wall-clock time")]
    InvalidBudget,

    /// Returned when a persistence operation fails.
    #[error("storage error: {0}")]
    Storage(String),

    /// Returned when an async task fails.
    #[cfg(feature = "async")]
    #[error("async task error: {0}")]
    TaskError(String),
}

/// A convenience alias for `core::result::Result<T, hyperstudy::Error>`.
pub type Result<T> = core::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
