use crate::convergence;
use crate::error::{Error, Result};
use crate::param::Params;
use crate::pareto;
use crate::trial::Trial;
use crate::types::{Direction, TrialState};

use super::Study;

impl Study {
    fn single_direction(&self) -> Result<Direction> {
        match self.directions.as_slice() {
            [direction] => Ok(*direction),
            dirs => Err(Error::SingleObjectiveOnly(dirs.len())),
        }
    }

    /// Return the completed trial with the best objective value.
    ///
    /// The "best" trial depends on the optimization direction. On ties the
    /// earliest trial wins.
    ///
    /// # Errors
    ///
    /// - [`Error::SingleObjectiveOnly`] on a multi-objective study; use
    ///   [`pareto_front`](Self::pareto_front) instead.
    /// - [`Error::NoCompletedTrials`] if no trial has completed.
    ///
    /// # Examples
    ///
    /// ```
    /// use hyperstudy::Study;
    ///
    /// let study = Study::builder().maximize().build().unwrap();
    /// assert!(study.best_trial().is_err());
    ///
    /// for value in [0.3, 0.8, 0.5] {
    ///     let trial = study.ask().unwrap();
    ///     trial.complete(value).unwrap();
    /// }
    ///
    /// assert_eq!(study.best_trial().unwrap().id(), 1);
    /// assert_eq!(study.best_value().unwrap(), 0.8);
    /// ```
    pub fn best_trial(&self) -> Result<Trial> {
        let direction = self.single_direction()?;
        let mut best: Option<(f64, Trial)> = None;
        for trial in self.trials() {
            if trial.state() != TrialState::Complete {
                continue;
            }
            let Some(value) = trial.value() else {
                continue;
            };
            if best
                .as_ref()
                .is_none_or(|(incumbent, _)| direction.is_better(value, *incumbent))
            {
                best = Some((value, trial));
            }
        }
        best.map(|(_, trial)| trial)
            .ok_or(Error::NoCompletedTrials)
    }

    /// Return the best objective value found so far.
    ///
    /// # Errors
    ///
    /// Same as [`best_trial`](Self::best_trial).
    pub fn best_value(&self) -> Result<f64> {
        self.best_trial()?
            .value()
            .ok_or(Error::NoCompletedTrials)
    }

    /// Return the parameters of the best trial.
    ///
    /// # Errors
    ///
    /// Same as [`best_trial`](Self::best_trial).
    pub fn best_params(&self) -> Result<Params> {
        Ok(self.best_trial()?.params().clone())
    }

    /// Return the top `n` completed trials, best first.
    ///
    /// If fewer than `n` completed trials exist, returns all of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingleObjectiveOnly`] on a multi-objective study.
    pub fn top_trials(&self, n: usize) -> Result<Vec<Trial>> {
        let direction = self.single_direction()?;
        let mut completed: Vec<(f64, Trial)> = self
            .trials()
            .into_iter()
            .filter(|t| t.state() == TrialState::Complete)
            .filter_map(|t| t.value().map(|v| (v, t)))
            .collect();
        // Stable sort keeps creation order among equal values.
        completed.sort_by(|(a, _), (b, _)| direction.orient(*b).total_cmp(&direction.orient(*a)));
        Ok(completed.into_iter().take(n).map(|(_, t)| t).collect())
    }

    /// The number of trials currently in `state`.
    #[must_use]
    pub fn count(&self, state: TrialState) -> usize {
        self.trials
            .read()
            .iter()
            .filter(|slot| slot.record.read().state() == state)
            .count()
    }

    /// The number of completed trials.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(TrialState::Complete)
    }

    /// The number of pruned trials.
    #[must_use]
    pub fn pruned_count(&self) -> usize {
        self.count(TrialState::Pruned)
    }

    /// The number of failed trials.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TrialState::Failed)
    }

    /// The number of trials still running.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.count(TrialState::Running)
    }

    /// The Pareto-optimal completed trials, in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MultiObjectiveOnly`] on a single-objective study;
    /// use [`best_trial`](Self::best_trial) instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use hyperstudy::{Direction, Study};
    ///
    /// let study = Study::builder()
    ///     .directions([Direction::Maximize, Direction::Maximize])
    ///     .build()
    ///     .unwrap();
    /// for values in [[1.0, 1.0], [2.0, 0.5], [0.5, 0.5]] {
    ///     study.ask().unwrap().complete(values).unwrap();
    /// }
    ///
    /// let front: Vec<u64> = study.pareto_front().unwrap().iter().map(|t| t.id()).collect();
    /// assert_eq!(front, vec![0, 1]);
    /// ```
    pub fn pareto_front(&self) -> Result<Vec<Trial>> {
        if self.directions.len() < 2 {
            return Err(Error::MultiObjectiveOnly);
        }
        Ok(pareto::pareto_front(&self.trials(), &self.directions))
    }

    /// The best-so-far value after each completed trial, in creation order.
    ///
    /// Pruned, failed, abandoned, and running trials are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingleObjectiveOnly`] on a multi-objective study.
    pub fn convergence_series(&self) -> Result<Vec<f64>> {
        let direction = self.single_direction()?;
        Ok(convergence::convergence_series(&self.trials(), direction))
    }
}
