use core::ops::ControlFlow;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use core::time::Duration;
use std::time::Instant;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::objective::{IntoValues, Objective};
use crate::trial::Trial;
use crate::types::TrialState;

use super::{RunningTrial, Study};

/// Bounds for an optimization loop: a trial count, a wall-clock timeout,
/// or both (whichever is hit first).
///
/// Once the budget is spent no new trials are asked; trials already
/// running finish normally.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use hyperstudy::RunBudget;
///
/// let budget = RunBudget::trials(100).with_timeout(Duration::from_secs(600));
/// assert_eq!(budget.max_trials(), Some(100));
///
/// // A bare count converts directly.
/// let budget: RunBudget = 20.into();
/// assert_eq!(budget.max_duration(), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunBudget {
    n_trials: Option<usize>,
    timeout: Option<Duration>,
}

impl RunBudget {
    /// At most `n_trials` new trials.
    #[must_use]
    pub fn trials(n_trials: usize) -> Self {
        Self {
            n_trials: Some(n_trials),
            timeout: None,
        }
    }

    /// Stop asking for new trials once `timeout` has elapsed.
    #[must_use]
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            n_trials: None,
            timeout: Some(timeout),
        }
    }

    /// Add or replace the trial-count bound.
    #[must_use]
    pub fn with_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = Some(n_trials);
        self
    }

    /// Add or replace the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The trial-count bound.
    #[must_use]
    pub fn max_trials(&self) -> Option<usize> {
        self.n_trials
    }

    /// The timeout.
    #[must_use]
    pub fn max_duration(&self) -> Option<Duration> {
        self.timeout
    }
}

impl From<usize> for RunBudget {
    fn from(n_trials: usize) -> Self {
        Self::trials(n_trials)
    }
}

impl From<Duration> for RunBudget {
    fn from(timeout: Duration) -> Self {
        Self::timeout(timeout)
    }
}

/// Shared accounting for one optimization run.
pub(super) struct BudgetTracker {
    max_trials: Option<usize>,
    deadline: Option<Instant>,
    started: AtomicUsize,
    stopped: AtomicBool,
}

impl BudgetTracker {
    pub(super) fn start(budget: RunBudget) -> Result<Self> {
        if budget.n_trials.is_none() && budget.timeout.is_none() {
            return Err(Error::InvalidBudget);
        }
        Ok(Self {
            max_trials: budget.n_trials,
            deadline: budget.timeout.map(|t| Instant::now() + t),
            started: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    /// Claim one trial. Fails once the count is spent, the deadline has
    /// passed, or [`stop`](Self::stop) was called.
    pub(super) fn try_acquire(&self) -> bool {
        if self.is_stopped() {
            return false;
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            trace_debug!("optimization deadline reached");
            self.stop();
            return false;
        }
        match self.max_trials {
            None => true,
            Some(max) => self
                .started
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < max).then_some(n + 1)
                })
                .is_ok(),
        }
    }

    pub(super) fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub(super) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Study {
    /// Run optimization with an objective.
    ///
    /// Runs up to `n_trials` evaluations sequentially. Shorthand for
    /// [`optimize_until`](Self::optimize_until) with
    /// [`RunBudget::trials`].
    ///
    /// # Errors
    ///
    /// See [`optimize_until`](Self::optimize_until).
    ///
    /// # Examples
    ///
    /// ```
    /// use hyperstudy::parameter::{FloatParam, SearchSpace};
    /// use hyperstudy::sampler::RandomSampler;
    /// use hyperstudy::{Error, RunningTrial, Study};
    ///
    /// let x_param = FloatParam::new("x", -10.0, 10.0);
    /// let study = Study::builder()
    ///     .space(SearchSpace::new().with(&x_param))
    ///     .sampler(RandomSampler::with_seed(42))
    ///     .build()
    ///     .unwrap();
    ///
    /// study
    ///     .optimize(10, |trial: &mut RunningTrial<'_>| {
    ///         let x = trial.get(&x_param)?;
    ///         Ok::<_, Error>(x * x)
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(study.n_trials(), 10);
    /// assert!(study.best_value().unwrap() >= 0.0);
    /// ```
    pub fn optimize<O: Objective>(&self, n_trials: usize, objective: O) -> Result<()> {
        self.optimize_until(RunBudget::trials(n_trials), objective)
    }

    /// Run optimization sequentially until `budget` is spent.
    ///
    /// Each round asks for a trial, hands it to the objective, and
    /// finalizes it unless it was pruned meanwhile. A failing objective
    /// marks only its own trial failed; so does a result with the wrong
    /// number of values or a NaN. The loop also stops when a
    /// [`before_trial`](Objective::before_trial) or
    /// [`after_trial`](Objective::after_trial) hook breaks.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBudget`] if `budget` is unbounded.
    /// - [`Error::ParameterConstraint`] if the sampler proposes an
    ///   assignment outside the search space.
    /// - [`Error::Storage`] if persisting a finished trial fails.
    #[allow(clippy::needless_pass_by_value)]
    pub fn optimize_until<O: Objective>(
        &self,
        budget: impl Into<RunBudget>,
        objective: O,
    ) -> Result<()> {
        let budget = budget.into();
        let tracker = BudgetTracker::start(budget)?;

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("optimize", study = %self.name, ?budget).entered();

        loop {
            if objective.before_trial(self).is_break() || !tracker.try_acquire() {
                break;
            }
            if self.run_trial(&objective)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Run optimization on `n_workers` threads until `budget` is spent.
    ///
    /// Workers share the budget: each one loops ask, evaluate, finalize,
    /// and the trial-count bound is respected exactly. The first error
    /// stops all workers from starting new trials and is returned once the
    /// in-flight trials have finished.
    ///
    /// # Errors
    ///
    /// Same as [`optimize_until`](Self::optimize_until).
    ///
    /// # Panics
    ///
    /// Panics if `n_workers` is 0, or if the objective panics.
    #[allow(clippy::needless_pass_by_value)]
    pub fn optimize_parallel<O>(
        &self,
        budget: impl Into<RunBudget>,
        n_workers: usize,
        objective: O,
    ) -> Result<()>
    where
        O: Objective + Sync,
    {
        assert!(n_workers > 0, "n_workers must be at least 1");
        let budget = budget.into();
        let tracker = BudgetTracker::start(budget)?;
        let first_error: Mutex<Option<Error>> = Mutex::new(None);

        #[cfg(feature = "tracing")]
        let _span =
            tracing::info_span!("optimize_parallel", study = %self.name, ?budget, n_workers)
                .entered();

        std::thread::scope(|scope| {
            for _ in 0..n_workers {
                scope.spawn(|| self.worker_loop(&tracker, &objective, &first_error));
            }
        });

        match first_error.into_inner() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn worker_loop<O: Objective>(
        &self,
        tracker: &BudgetTracker,
        objective: &O,
        first_error: &Mutex<Option<Error>>,
    ) {
        loop {
            if objective.before_trial(self).is_break() {
                tracker.stop();
                break;
            }
            if !tracker.try_acquire() {
                break;
            }
            match self.run_trial(objective) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => tracker.stop(),
                Err(e) => {
                    tracker.stop();
                    first_error.lock().get_or_insert(e);
                }
            }
        }
    }

    /// One full round: ask, evaluate, finalize, and run the `after_trial` hook.
    pub(super) fn run_trial<O: Objective + ?Sized>(
        &self,
        objective: &O,
    ) -> Result<ControlFlow<()>> {
        let mut trial = self.ask()?;
        let outcome = objective.evaluate(&mut trial);
        Ok(match self.finish_evaluation(&trial, outcome)? {
            Some(finished) => objective.after_trial(self, &finished),
            None => ControlFlow::Continue(()),
        })
    }

    /// Finalize a trial from its objective's outcome.
    ///
    /// Returns the finished record if the trial completed.
    fn finish_evaluation<R, E>(
        &self,
        trial: &RunningTrial<'_>,
        outcome: core::result::Result<R, E>,
    ) -> Result<Option<Trial>>
    where
        R: IntoValues,
        E: ToString,
    {
        // Pruned while evaluating; the objective's result is irrelevant.
        if trial.state() != TrialState::Running {
            return Ok(None);
        }

        let reason = match outcome {
            Ok(values) => match self.complete_record(&trial.record, values.into_values()) {
                Ok(finished) => return Ok(Some(finished)),
                Err(e @ (Error::ValueCountMismatch { .. } | Error::InvalidValue(_))) => {
                    e.to_string()
                }
                Err(Error::InvalidState { .. }) => return Ok(None),
                Err(e) => return Err(e),
            },
            Err(e) => e.to_string(),
        };

        trace_warn!(study = %self.name, trial_id = trial.id(), %reason, "objective failed");
        match self.fail_record(&trial.record, reason) {
            Ok(()) | Err(Error::InvalidState { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
