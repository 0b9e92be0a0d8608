//! The [`Objective`] trait defines what gets optimized.
//!
//! For simple closures, pass them directly to
//! [`Study::optimize`](crate::Study::optimize):
//!
//! ```
//! use hyperstudy::parameter::{FloatParam, SearchSpace};
//! use hyperstudy::{Error, RunningTrial, Study};
//!
//! let x = FloatParam::new("x", -10.0, 10.0);
//! let study = Study::builder()
//!     .minimize()
//!     .space(SearchSpace::new().with(&x))
//!     .build()
//!     .unwrap();
//!
//! study
//!     .optimize(20, |trial: &mut RunningTrial<'_>| {
//!         let v = trial.get(&x)?;
//!         Ok::<_, Error>((v - 3.0).powi(2))
//!     })
//!     .unwrap();
//! ```
//!
//! For early stopping of the whole loop, implement [`Objective`] on a
//! struct and override [`before_trial`](Objective::before_trial) or
//! [`after_trial`](Objective::after_trial):
//!
//! ```
//! use std::ops::ControlFlow;
//!
//! use hyperstudy::parameter::{FloatParam, SearchSpace};
//! use hyperstudy::{Error, Objective, RunningTrial, Study, Trial};
//!
//! struct StopBelow {
//!     x: FloatParam,
//!     target: f64,
//! }
//!
//! impl Objective for StopBelow {
//!     type Output = f64;
//!     type Error = Error;
//!
//!     fn evaluate(&self, trial: &mut RunningTrial<'_>) -> Result<f64, Error> {
//!         Ok(trial.get(&self.x)?.abs())
//!     }
//!
//!     fn after_trial(&self, _study: &Study, trial: &Trial) -> ControlFlow<()> {
//!         match trial.value() {
//!             Some(v) if v < self.target => ControlFlow::Break(()),
//!             _ => ControlFlow::Continue(()),
//!         }
//!     }
//! }
//!
//! let x = FloatParam::new("x", -1.0, 1.0);
//! let study = Study::builder()
//!     .space(SearchSpace::new().with(&x))
//!     .build()
//!     .unwrap();
//! study.optimize(1000, StopBelow { x, target: 0.5 }).unwrap();
//! assert!(study.best_value().unwrap() < 0.5);
//! ```

use core::ops::ControlFlow;

use crate::study::{RunningTrial, Study};
use crate::trial::Trial;

/// Conversion from an objective's return value into one value per objective.
///
/// Implemented for `f64` (single-objective), `Vec<f64>`, and `[f64; N]`.
pub trait IntoValues {
    /// Consume `self` and return the objective values in declaration order.
    fn into_values(self) -> Vec<f64>;
}

impl IntoValues for f64 {
    fn into_values(self) -> Vec<f64> {
        vec![self]
    }
}

impl IntoValues for Vec<f64> {
    fn into_values(self) -> Vec<f64> {
        self
    }
}

impl<const N: usize> IntoValues for [f64; N] {
    fn into_values(self) -> Vec<f64> {
        self.to_vec()
    }
}

/// Defines an objective function with lifecycle hooks for optimization.
///
/// The only required method is [`evaluate`](Objective::evaluate). It reads
/// parameters from the running trial, may [`report`](RunningTrial::report)
/// intermediate values, and returns the final objective value(s).
///
/// When a report comes back as
/// [`PruneDecision::Prune`](crate::PruneDecision::Prune) the trial is
/// already pruned: return promptly. Whatever `evaluate` returns afterwards
/// is ignored.
///
/// An `Err` marks only this trial [`Failed`](crate::TrialState::Failed),
/// with the error's string form as the reason; the loop continues.
///
/// # Thread safety
///
/// [`Study::optimize_parallel`](crate::Study::optimize_parallel) additionally
/// requires `Sync` on the objective, and the async loop requires
/// `Send + Sync + 'static`. The sequential loops have no such requirement.
pub trait Objective {
    /// The successful result of [`evaluate`](Objective::evaluate).
    type Output: IntoValues;

    /// The error type returned by [`evaluate`](Objective::evaluate).
    type Error: ToString;

    /// Evaluate the objective for a single trial.
    ///
    /// # Errors
    ///
    /// Any error; the trial is recorded as failed.
    fn evaluate(&self, trial: &mut RunningTrial<'_>) -> Result<Self::Output, Self::Error>;

    /// Called before each trial is created.
    ///
    /// Return `ControlFlow::Break(())` to stop the loop before the next
    /// trial starts. Default: always continues.
    fn before_trial(&self, _study: &Study) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called after each **completed** trial (not failed or pruned) with a
    /// snapshot of the finished record.
    ///
    /// Return `ControlFlow::Break(())` to stop issuing new trials. Default:
    /// always continues.
    fn after_trial(&self, _study: &Study, _trial: &Trial) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F, R, E> Objective for F
where
    F: Fn(&mut RunningTrial<'_>) -> Result<R, E>,
    R: IntoValues,
    E: ToString,
{
    type Output = R;
    type Error = E;

    fn evaluate(&self, trial: &mut RunningTrial<'_>) -> Result<R, E> {
        self(trial)
    }
}
