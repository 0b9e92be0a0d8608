//! Sampler trait and reference implementations.
//!
//! A sampler proposes the complete parameter assignment for the next trial.
//! The study validates the proposal against its
//! [`SearchSpace`](crate::parameter::SearchSpace) before the trial is
//! created, so a misbehaving sampler surfaces as
//! [`Error::ParameterConstraint`](crate::Error::ParameterConstraint)
//! instead of a bad trial.
//!
//! | Sampler | Strategy |
//! |---------|----------|
//! | [`RandomSampler`] | Uniform random, respecting log scale and steps |
//! | [`GridSampler`] | Exhaustive Cartesian grid, cycling once exhausted |

pub mod grid;
pub mod random;

pub use grid::GridSampler;
pub use random::RandomSampler;

use crate::param::Params;
use crate::parameter::SearchSpace;
use crate::trial::Trial;

/// Trait for pluggable parameter sampling strategies.
///
/// The trait requires `Send + Sync`: several workers may call
/// [`suggest`](Sampler::suggest) at the same time while the history keeps
/// growing. Implementations that need serialized access must lock
/// internally.
///
/// Given the same `history`, `trial_id`, and seed, an implementation must
/// return the same assignment, so that studies are reproducible.
///
/// # Implementing a custom sampler
///
/// ```
/// use hyperstudy::parameter::SearchSpace;
/// use hyperstudy::sampler::Sampler;
/// use hyperstudy::{ParamValue, Params, Trial};
///
/// /// Always proposes the lower bound of every float parameter.
/// struct LowerBound;
///
/// impl Sampler for LowerBound {
///     fn suggest(&self, space: &SearchSpace, _trial_id: u64, _history: &[Trial]) -> Params {
///         space
///             .iter()
///             .filter_map(|(name, dist)| match dist {
///                 hyperstudy::distribution::Distribution::Float(d) => {
///                     Some((name.to_string(), ParamValue::Float(d.low)))
///                 }
///                 _ => None,
///             })
///             .collect()
///     }
/// }
/// ```
pub trait Sampler: Send + Sync {
    /// Proposes the parameter assignment for trial `trial_id`.
    ///
    /// # Arguments
    ///
    /// * `space` - The study's declared search space.
    /// * `trial_id` - The id the new trial will receive.
    /// * `history` - Snapshots of every trial so far, in creation order,
    ///   including running trials and their intermediate reports.
    fn suggest(&self, space: &SearchSpace, trial_id: u64, history: &[Trial]) -> Params;
}
