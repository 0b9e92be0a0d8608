#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Trial and study bookkeeping for hyperparameter optimization.
//!
//! A [`Study`] owns many [`Trial`]s. Each trial gets a parameter assignment
//! from a [`Sampler`](sampler::Sampler), accumulates intermediate reports
//! that a [`Pruner`](pruner::Pruner) uses to stop it early, and ends
//! complete, pruned, failed, or abandoned. Multi-objective studies expose
//! their [Pareto front](Study::pareto_front); single-objective studies a
//! [best-so-far series](Study::convergence_series). A
//! [`PersistenceStore`](storage::PersistenceStore) lets a study be saved
//! and resumed.
//!
//! # Getting Started
//!
//! ```
//! use hyperstudy::prelude::*;
//!
//! let x = FloatParam::new("x", -10.0, 10.0);
//! let study = Study::builder()
//!     .minimize()
//!     .space(SearchSpace::new().with(&x))
//!     .sampler(RandomSampler::with_seed(1))
//!     .build()
//!     .unwrap();
//!
//! study
//!     .optimize(50, |trial: &mut RunningTrial<'_>| {
//!         let v = trial.get(&x)?;
//!         Ok::<_, Error>((v - 3.0).powi(2))
//!     })
//!     .unwrap();
//!
//! let best = study.best_trial().unwrap();
//! println!("x = {:.4}, f(x) = {:.4}", best.get(&x).unwrap(), best.value().unwrap());
//! ```
//!
//! # Progressive reports and pruning
//!
//! ```
//! use hyperstudy::prelude::*;
//!
//! let study = Study::builder()
//!     .pruner(ThresholdPruner::new().upper(1.0))
//!     .build()
//!     .unwrap();
//!
//! study
//!     .optimize(5, |trial: &mut RunningTrial<'_>| {
//!         let mut loss = 4.0;
//!         for epoch in 0..10 {
//!             loss /= 2.0;
//!             if trial.report(epoch, loss)?.is_prune() {
//!                 break;
//!             }
//!         }
//!         Ok::<_, Error>(loss)
//!     })
//!     .unwrap();
//!
//! // Every trial reports 2.0 at epoch 0, above the threshold.
//! assert_eq!(study.pruned_count(), 5);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Study`] | Create trials, route reports to the pruner, finalize and persist them, derive views. |
//! | [`Trial`] | One parameter assignment with its state, reports, and final values. |
//! | [`RunningTrial`] | Exclusive handle the objective uses to read parameters and report. |
//! | [`SearchSpace`](parameter::SearchSpace) | Declared parameters; every assignment is validated against it. |
//! | [`Sampler`](sampler::Sampler) | Proposes assignments ([`RandomSampler`](sampler::RandomSampler), [`GridSampler`](sampler::GridSampler)). |
//! | [`Pruner`](pruner::Pruner) | Decides early stopping ([`MedianPruner`](pruner::MedianPruner), [`PercentilePruner`](pruner::PercentilePruner), [`ThresholdPruner`](pruner::ThresholdPruner)). |
//! | [`PersistenceStore`](storage::PersistenceStore) | Saves and loads [`StudySnapshot`]s ([`MemoryStore`](storage::MemoryStore), [`JsonFileStore`](storage::JsonFileStore)). |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at trial transitions | on |
//! | `async` | [`Study::optimize_async`] on tokio's blocking pool | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod convergence;
pub mod distribution;
mod error;
pub mod objective;
mod param;
pub mod parameter;
pub mod pareto;
pub mod pruner;
mod rng_util;
pub mod sampler;
pub mod storage;
mod study;
mod trial;
mod types;

pub use error::{Error, Result};
pub use objective::{IntoValues, Objective};
pub use param::{ParamValue, Params};
pub use study::{
    PruneDecision, RunBudget, RunningTrial, SNAPSHOT_VERSION, Study, StudyBuilder, StudySnapshot,
};
pub use trial::Trial;
pub use types::{Direction, TrialState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use hyperstudy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::objective::{IntoValues, Objective};
    pub use crate::param::{ParamValue, Params};
    pub use crate::parameter::{
        BoolParam, CategoricalParam, FloatParam, IntParam, Parameter, SearchSpace,
    };
    pub use crate::pruner::{MedianPruner, NopPruner, PercentilePruner, Pruner, ThresholdPruner};
    pub use crate::sampler::{GridSampler, RandomSampler, Sampler};
    pub use crate::storage::{JsonFileStore, MemoryStore, PersistenceStore};
    pub use crate::study::{PruneDecision, RunBudget, RunningTrial, Study, StudyBuilder, StudySnapshot};
    pub use crate::trial::Trial;
    pub use crate::types::{Direction, TrialState};
}
