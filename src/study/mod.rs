//! Study implementation for managing optimization trials.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::objective::IntoValues;
use crate::param::{ParamValue, Params};
use crate::parameter::{Parameter, SearchSpace};
use crate::pruner::Pruner;
use crate::sampler::Sampler;
use crate::storage::PersistenceStore;
use crate::trial::Trial;
use crate::types::{Direction, TrialState};

mod analysis;
mod builder;
mod optimize;
mod persistence;

#[cfg(feature = "async")]
mod async_impl;

pub use builder::StudyBuilder;
pub use optimize::RunBudget;
pub use persistence::{SNAPSHOT_VERSION, StudySnapshot};

/// The outcome of an intermediate report.
///
/// Returned by [`RunningTrial::report`] and [`Study::report`]. On
/// [`Prune`](PruneDecision::Prune) the trial has already been moved to
/// [`TrialState::Pruned`]; the caller should stop evaluating it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PruneDecision {
    /// Keep evaluating.
    Continue,
    /// The trial was pruned.
    Prune,
}

impl PruneDecision {
    /// Returns `true` for [`PruneDecision::Prune`].
    #[must_use]
    pub fn is_prune(self) -> bool {
        self == PruneDecision::Prune
    }
}

/// One trial record in the study's arena.
struct TrialSlot {
    id: u64,
    record: Arc<RwLock<Trial>>,
}

/// A study owns a set of trials and drives their lifecycle.
///
/// Trials live in an append-only arena. Creation is serialized by a single
/// mutex; after that each record sits behind its own lock, so reports and
/// terminal transitions are atomic to readers. Every read that feeds a
/// sampler, pruner, or derived view works on cloned snapshots.
///
/// `Study` is `Send + Sync`: share it by reference across scoped threads,
/// or wrap it in an [`Arc`] for the async loop.
///
/// # Examples
///
/// ```
/// use hyperstudy::parameter::{FloatParam, SearchSpace};
/// use hyperstudy::{PruneDecision, Study, TrialState};
///
/// let lr = FloatParam::new("lr", 1e-4, 1e-1).log_scale();
/// let study = Study::builder()
///     .name("ask-tell")
///     .minimize()
///     .space(SearchSpace::new().with(&lr))
///     .build()
///     .unwrap();
///
/// let mut trial = study.ask().unwrap();
/// let lr_value = trial.get(&lr).unwrap();
/// assert!((1e-4..=1e-1).contains(&lr_value));
///
/// assert_eq!(trial.report(1, 0.9).unwrap(), PruneDecision::Continue);
/// trial.complete(0.42).unwrap();
///
/// assert_eq!(study.trials()[0].state(), TrialState::Complete);
/// ```
pub struct Study {
    name: String,
    directions: Vec<Direction>,
    space: SearchSpace,
    sampler: Arc<dyn Sampler>,
    pruner: Arc<dyn Pruner>,
    store: Option<Arc<dyn PersistenceStore>>,
    trials: RwLock<Vec<TrialSlot>>,
    /// The next trial id. Held for the whole of `ask`, which makes
    /// sample-validate-append atomic.
    next_id: Mutex<u64>,
    enqueued: Mutex<VecDeque<Params>>,
    /// Orders snapshot saves so an older snapshot never overwrites a newer one.
    persist_lock: Mutex<()>,
}

impl Study {
    /// Return a [`StudyBuilder`] for constructing a study with a fluent API.
    #[must_use]
    pub fn builder() -> StudyBuilder {
        StudyBuilder::new()
    }

    /// The study name, used as its id in a [`PersistenceStore`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One direction per objective.
    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// The number of objectives.
    #[must_use]
    pub fn n_objectives(&self) -> usize {
        self.directions.len()
    }

    /// The declared search space.
    #[must_use]
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Return a reference to the study's pruner.
    #[must_use]
    pub fn pruner(&self) -> &dyn Pruner {
        &*self.pruner
    }

    /// The number of trials in the study, in any state.
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.trials.read().len()
    }

    /// Snapshots of every trial, in creation order.
    #[must_use]
    pub fn trials(&self) -> Vec<Trial> {
        self.trials
            .read()
            .iter()
            .map(|slot| slot.record.read().clone())
            .collect()
    }

    /// Snapshot of one trial.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTrial`] if no trial has this id.
    pub fn trial(&self, trial_id: u64) -> Result<Trial> {
        Ok(self.record(trial_id)?.read().clone())
    }

    /// Enqueue a fixed parameter assignment for the next trial.
    ///
    /// The next [`ask`](Self::ask) (or the next trial of an `optimize*`
    /// loop) uses these exact parameters instead of calling the sampler.
    /// Enqueued assignments are consumed in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterConstraint`] if `params` does not satisfy
    /// the search space.
    ///
    /// # Examples
    ///
    /// ```
    /// use hyperstudy::parameter::{IntParam, SearchSpace};
    /// use hyperstudy::{ParamValue, Params, Study};
    ///
    /// let depth = IntParam::new("depth", 1, 12);
    /// let study = Study::builder()
    ///     .space(SearchSpace::new().with(&depth))
    ///     .build()
    ///     .unwrap();
    ///
    /// study
    ///     .enqueue(Params::from([("depth".to_string(), ParamValue::Int(6))]))
    ///     .unwrap();
    /// let trial = study.ask().unwrap();
    /// assert_eq!(trial.get(&depth).unwrap(), 6);
    /// ```
    pub fn enqueue(&self, params: Params) -> Result<()> {
        self.space.check(&params)?;
        self.enqueued.lock().push_back(params);
        Ok(())
    }

    /// The number of enqueued assignments not yet consumed.
    #[must_use]
    pub fn n_enqueued(&self) -> usize {
        self.enqueued.lock().len()
    }

    /// Create a new running trial.
    ///
    /// Uses the oldest enqueued assignment if there is one, otherwise asks
    /// the sampler with a snapshot of the full history (running trials and
    /// their reports included). The assignment is validated against the
    /// search space before the trial is registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterConstraint`] if the assignment violates the
    /// search space. No trial is created and no id is consumed.
    pub fn ask(&self) -> Result<RunningTrial<'_>> {
        let mut next_id = self.next_id.lock();
        let id = *next_id;

        let enqueued = self.enqueued.lock().pop_front();
        let params = match enqueued {
            Some(params) => params,
            None => {
                let history = self.trials();
                self.sampler.suggest(&self.space, id, &history)
            }
        };
        self.space.check(&params)?;

        let record = Arc::new(RwLock::new(Trial::new(id, params.clone())));
        self.trials.write().push(TrialSlot {
            id,
            record: Arc::clone(&record),
        });
        *next_id = id + 1;
        drop(next_id);

        trace_debug!(study = %self.name, trial_id = id, "trial created");
        Ok(RunningTrial {
            study: self,
            id,
            params,
            record,
        })
    }

    /// Append an intermediate report to a running trial and consult the pruner.
    ///
    /// The pruner sees a snapshot of the trial including this report, plus
    /// snapshots of every other trial, in any state, that reported at the
    /// same `step`. If it says stop, the trial is pruned before this call
    /// returns.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownTrial`] if no trial has this id.
    /// - [`Error::InvalidState`] if the trial is not running.
    /// - [`Error::NonMonotonicStep`] if `step` does not advance.
    /// - [`Error::InvalidValue`] if `value` is NaN.
    /// - [`Error::Storage`] if the prune could not be persisted.
    pub fn report(&self, trial_id: u64, step: u64, value: f64) -> Result<PruneDecision> {
        let record = self.record(trial_id)?;
        self.report_record(&record, step, value)
    }

    /// Complete a running trial with its final objective value(s).
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownTrial`] if no trial has this id.
    /// - [`Error::InvalidState`] if the trial is not running.
    /// - [`Error::ValueCountMismatch`] if the value count differs from the
    ///   number of objectives.
    /// - [`Error::InvalidValue`] if a value is NaN.
    /// - [`Error::Storage`] if the result could not be persisted.
    pub fn complete(&self, trial_id: u64, values: impl IntoValues) -> Result<()> {
        let record = self.record(trial_id)?;
        self.complete_record(&record, values.into_values())
            .map(|_| ())
    }

    /// Prune a running trial directly, bypassing the pruner.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownTrial`], [`Error::InvalidState`], or
    /// [`Error::Storage`].
    pub fn prune(&self, trial_id: u64) -> Result<()> {
        let record = self.record(trial_id)?;
        record.write().prune()?;
        trace_info!(study = %self.name, trial_id, "trial pruned");
        self.persist()
    }

    /// Mark a running trial failed.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownTrial`], [`Error::InvalidState`], or
    /// [`Error::Storage`].
    pub fn fail(&self, trial_id: u64, reason: impl Into<String>) -> Result<()> {
        let record = self.record(trial_id)?;
        self.fail_record(&record, reason.into())
    }

    /// Finish a trial from the outcome of an externally run evaluation.
    ///
    /// `Ok` completes the trial, `Err` fails it with the error's string form.
    ///
    /// # Errors
    ///
    /// Same as [`complete`](Self::complete) and [`fail`](Self::fail).
    pub fn tell<R, E>(&self, trial_id: u64, outcome: core::result::Result<R, E>) -> Result<()>
    where
        R: IntoValues,
        E: ToString,
    {
        match outcome {
            Ok(values) => self.complete(trial_id, values),
            Err(e) => self.fail(trial_id, e.to_string()),
        }
    }

    /// Move every still-running trial to [`TrialState::Abandoned`].
    ///
    /// Call this at shutdown or after a deadline, when the remaining
    /// running trials will never be finished. Returns the ids of the
    /// abandoned trials, in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the result could not be persisted. The
    /// trials are abandoned either way.
    pub fn abandon_running(&self) -> Result<Vec<u64>> {
        let abandoned: Vec<u64> = self
            .trials
            .read()
            .iter()
            .filter(|slot| slot.record.write().abandon().is_ok())
            .map(|slot| slot.id)
            .collect();

        if abandoned.is_empty() {
            return Ok(abandoned);
        }
        trace_info!(study = %self.name, n = abandoned.len(), "abandoned running trials");
        self.persist()?;
        Ok(abandoned)
    }

    fn record(&self, trial_id: u64) -> Result<Arc<RwLock<Trial>>> {
        let trials = self.trials.read();
        trials
            .binary_search_by_key(&trial_id, |slot| slot.id)
            .map(|i| Arc::clone(&trials[i].record))
            .map_err(|_| Error::UnknownTrial(trial_id))
    }

    /// Snapshots of every trial other than `trial_id` that reported at `step`.
    fn siblings_at(&self, trial_id: u64, step: u64) -> Vec<Trial> {
        self.trials
            .read()
            .iter()
            .filter(|slot| slot.id != trial_id)
            .filter_map(|slot| {
                let trial = slot.record.read();
                trial.report_at(step).map(|_| trial.clone())
            })
            .collect()
    }

    fn report_record(&self, record: &RwLock<Trial>, step: u64, value: f64) -> Result<PruneDecision> {
        let current = {
            let mut trial = record.write();
            trial.report(step, value)?;
            trial.clone()
        };

        let siblings = self.siblings_at(current.id(), step);
        if !self.pruner.should_prune(&current, step, &siblings) {
            return Ok(PruneDecision::Continue);
        }

        record.write().prune()?;
        trace_info!(study = %self.name, trial_id = current.id(), step, value, "trial pruned");
        self.persist()?;
        Ok(PruneDecision::Prune)
    }

    fn complete_record(&self, record: &RwLock<Trial>, values: Vec<f64>) -> Result<Trial> {
        let finished = {
            let mut trial = record.write();
            trial.complete(values, self.directions.len())?;
            trial.clone()
        };
        trace_info!(study = %self.name, trial_id = finished.id(), values = ?finished.values(), "trial completed");
        #[cfg(feature = "tracing")]
        self.log_if_new_best(&finished);
        self.persist()?;
        Ok(finished)
    }

    fn fail_record(&self, record: &RwLock<Trial>, reason: String) -> Result<()> {
        let mut trial = record.write();
        trial.fail(reason)?;
        trace_debug!(study = %self.name, trial_id = trial.id(), reason = trial.fail_reason(), "trial failed");
        drop(trial);
        self.persist()
    }

    #[cfg(feature = "tracing")]
    fn log_if_new_best(&self, finished: &Trial) {
        let ([direction], Some(value)) = (self.directions.as_slice(), finished.value()) else {
            return;
        };
        let beaten = self.trials().iter().any(|t| {
            t.id() != finished.id()
                && t.state() == TrialState::Complete
                && t.value().is_some_and(|v| !direction.is_better(value, v))
        });
        if !beaten {
            tracing::info!(study = %self.name, trial_id = finished.id(), value, "new best value found");
        }
    }
}

/// Exclusive handle to a trial created by [`Study::ask`].
///
/// Only the holder reports on and finalizes the trial, so the handle is not
/// `Clone`. Dropping a handle without finishing it leaves the trial
/// [`Running`](TrialState::Running); use [`Study::abandon_running`] to close
/// such trials at shutdown.
pub struct RunningTrial<'a> {
    study: &'a Study,
    id: u64,
    params: Params,
    record: Arc<RwLock<Trial>>,
}

impl RunningTrial<'_> {
    /// The trial id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The parameter assignment.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The raw value of one parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// The typed value of `param`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterConstraint`] if the parameter is not part of
    /// this trial or has a different type.
    pub fn get<P: Parameter>(&self, param: &P) -> Result<P::Value> {
        param.get(&self.params)
    }

    /// Report an intermediate value; see [`Study::report`].
    ///
    /// # Errors
    ///
    /// Same as [`Study::report`], minus [`Error::UnknownTrial`].
    pub fn report(&mut self, step: u64, value: f64) -> Result<PruneDecision> {
        self.study.report_record(&self.record, step, value)
    }

    /// The current state of the trial.
    #[must_use]
    pub fn state(&self) -> TrialState {
        self.record.read().state()
    }

    /// Whether the trial has been pruned.
    #[must_use]
    pub fn is_pruned(&self) -> bool {
        self.state() == TrialState::Pruned
    }

    /// A point-in-time copy of the trial record.
    #[must_use]
    pub fn snapshot(&self) -> Trial {
        self.record.read().clone()
    }

    /// Complete the trial; see [`Study::complete`].
    ///
    /// # Errors
    ///
    /// Same as [`Study::complete`], minus [`Error::UnknownTrial`].
    pub fn complete(self, values: impl IntoValues) -> Result<()> {
        self.study
            .complete_record(&self.record, values.into_values())
            .map(|_| ())
    }

    /// Fail the trial; see [`Study::fail`].
    ///
    /// # Errors
    ///
    /// Same as [`Study::fail`], minus [`Error::UnknownTrial`].
    pub fn fail(self, reason: impl Into<String>) -> Result<()> {
        self.study.fail_record(&self.record, reason.into())
    }
}

impl core::fmt::Debug for RunningTrial<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RunningTrial")
            .field("study", &self.study.name)
            .field("id", &self.id)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
