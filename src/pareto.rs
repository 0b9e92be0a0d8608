//! Pareto front selection for multi-objective studies.
//!
//! In multi-objective optimization there is generally no single best
//! trial. Instead, the goal is the **Pareto front**: the set of trials
//! where no objective can be improved without worsening another.
//!
//! Every objective is first mapped onto a "higher is better" scale using
//! its [`Direction`]. Trial `b` then dominates trial `a` when `b` is at
//! least as good on every objective and strictly better on one. Trials with
//! identical value vectors do not dominate each other, so both stay on the
//! front.
//!
//! The filter is a plain pairwise comparison, O(n²) in the number of
//! completed trials. Membership depends only on the value vectors, never on
//! input order; results are returned in creation order.
//!
//! # Example
//!
//! ```
//! use hyperstudy::Direction;
//! use hyperstudy::pareto::pareto_front_indices;
//!
//! let values = vec![
//!     vec![1.0, 1.0], // on the front
//!     vec![2.0, 0.5], // on the front
//!     vec![0.5, 0.5], // dominated by (1.0, 1.0)
//! ];
//! let dirs = [Direction::Maximize, Direction::Maximize];
//! assert_eq!(pareto_front_indices(&values, &dirs), vec![0, 1]);
//! ```

use crate::trial::Trial;
use crate::types::{Direction, TrialState};

/// Returns `true` if value vector `a` Pareto-dominates `b`.
///
/// # Panics
///
/// Debug builds assert that `a`, `b`, and `directions` have equal length.
#[must_use]
pub fn dominates(a: &[f64], b: &[f64], directions: &[Direction]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), directions.len());

    let mut strictly_better = false;
    for ((&av, &bv), dir) in a.iter().zip(b).zip(directions) {
        let (av, bv) = (dir.orient(av), dir.orient(bv));
        if av < bv {
            return false;
        }
        if av > bv {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Indices of the non-dominated vectors in `values`, in ascending order.
#[must_use]
pub fn pareto_front_indices(values: &[Vec<f64>], directions: &[Direction]) -> Vec<usize> {
    (0..values.len())
        .filter(|&i| {
            !values
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && dominates(other, &values[i], directions))
        })
        .collect()
}

/// The non-dominated subset of the `Complete` trials in `trials`.
///
/// Trials in any other state are ignored. The result is ordered by trial
/// creation order, that is by id.
#[must_use]
pub fn pareto_front(trials: &[Trial], directions: &[Direction]) -> Vec<Trial> {
    let mut completed: Vec<&Trial> = trials
        .iter()
        .filter(|t| t.state() == TrialState::Complete)
        .filter(|t| t.values().is_some_and(|v| v.len() == directions.len()))
        .collect();
    completed.sort_by_key(|t| t.id());

    let values: Vec<Vec<f64>> = completed
        .iter()
        .map(|t| t.values().map(<[f64]>::to_vec).unwrap_or_default())
        .collect();

    pareto_front_indices(&values, directions)
        .into_iter()
        .map(|i| completed[i].clone())
        .collect()
}
