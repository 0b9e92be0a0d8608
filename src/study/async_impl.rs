use core::ops::ControlFlow;
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};

use crate::error::{Error, Result};
use crate::objective::Objective;

use super::Study;
use super::optimize::{BudgetTracker, RunBudget};

impl Study {
    /// Run optimization from async code with bounded concurrency.
    ///
    /// Spawns up to `concurrency` rounds at a time on tokio's blocking pool
    /// ([`JoinSet::spawn_blocking`]), keeping the runtime responsive for
    /// CPU-bound objectives. Each round asks, evaluates, and finalizes one
    /// trial. Returning `Break` from a hook stops spawning new rounds while
    /// in-flight ones drain.
    ///
    /// The study is taken as an `Arc` because every round runs on its own
    /// blocking task.
    ///
    /// # Errors
    ///
    /// - Same as [`optimize_until`](Self::optimize_until).
    /// - [`Error::TaskError`] if a blocking task panics. Its trial stays
    ///   running; call [`abandon_running`](Self::abandon_running) to close it.
    ///
    /// # Panics
    ///
    /// Panics if `concurrency` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use hyperstudy::parameter::{FloatParam, SearchSpace};
    /// use hyperstudy::{Error, RunningTrial, Study};
    ///
    /// # #[cfg(feature = "async")]
    /// # async fn example() -> hyperstudy::Result<()> {
    /// let x = FloatParam::new("x", -10.0, 10.0);
    /// let study = Arc::new(
    ///     Study::builder()
    ///         .space(SearchSpace::new().with(&x))
    ///         .build()?,
    /// );
    ///
    /// study
    ///     .optimize_async(10, 4, move |trial: &mut RunningTrial<'_>| {
    ///         let v = trial.get(&x)?;
    ///         Ok::<_, Error>(v * v)
    ///     })
    ///     .await?;
    ///
    /// assert_eq!(study.n_trials(), 10);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn optimize_async<O>(
        self: &Arc<Self>,
        budget: impl Into<RunBudget>,
        concurrency: usize,
        objective: O,
    ) -> Result<()>
    where
        O: Objective + Send + Sync + 'static,
    {
        assert!(concurrency > 0, "concurrency must be at least 1");
        let budget = budget.into();
        let tracker = BudgetTracker::start(budget)?;

        let run = self.run_async(tracker, concurrency, Arc::new(objective));
        #[cfg(feature = "tracing")]
        let run = tracing::Instrument::instrument(
            run,
            tracing::info_span!("optimize_async", study = %self.name, ?budget, concurrency),
        );
        run.await
    }

    async fn run_async<O>(
        self: &Arc<Self>,
        tracker: BudgetTracker,
        concurrency: usize,
        objective: Arc<O>,
    ) -> Result<()>
    where
        O: Objective + Send + Sync + 'static,
    {
        let mut join_set: JoinSet<Result<ControlFlow<()>>> = JoinSet::new();
        let mut first_error = None;

        loop {
            // If the join set is full, drain one result to free a slot.
            while join_set.len() >= concurrency {
                if let Some(joined) = join_set.join_next().await {
                    settle(joined, &tracker, &mut first_error);
                }
            }
            if tracker.is_stopped() || objective.before_trial(self).is_break() {
                break;
            }
            if !tracker.try_acquire() {
                break;
            }

            let study = Arc::clone(self);
            let obj = Arc::clone(&objective);
            join_set.spawn_blocking(move || study.run_trial(&*obj));
        }

        // Drain remaining in-flight rounds.
        while let Some(joined) = join_set.join_next().await {
            settle(joined, &tracker, &mut first_error);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn settle(
    joined: core::result::Result<Result<ControlFlow<()>>, JoinError>,
    tracker: &BudgetTracker,
    first_error: &mut Option<Error>,
) {
    let outcome = match joined {
        Ok(outcome) => outcome,
        Err(e) => Err(Error::TaskError(e.to_string())),
    };
    match outcome {
        Ok(ControlFlow::Continue(())) => {}
        Ok(ControlFlow::Break(())) => tracker.stop(),
        Err(e) => {
            tracker.stop();
            first_error.get_or_insert(e);
        }
    }
}
