use hyperstudy::pruner::{PercentilePruner, Pruner};
use hyperstudy::{Direction, Trial};

use super::{finished, running};

/// Five finished siblings reporting 1.0 through 5.0 at step 0.
fn siblings() -> Vec<Trial> {
    (0..5u32)
        .map(|i| finished(u64::from(i), &[(0, f64::from(i) + 1.0)]))
        .collect()
}

#[test]
fn keeps_only_the_best_quartile_when_minimizing() {
    // 25th percentile of [1..5] is 2.0.
    let pruner = PercentilePruner::new(25.0, Direction::Minimize);
    assert!(!pruner.should_prune(&running(9, &[(0, 2.0)]), 0, &siblings()));
    assert!(pruner.should_prune(&running(9, &[(0, 2.5)]), 0, &siblings()));
}

#[test]
fn keeps_only_the_best_quartile_when_maximizing() {
    // Best 25% when maximizing means at least the 75th percentile, 4.0.
    let pruner = PercentilePruner::new(25.0, Direction::Maximize);
    assert!(!pruner.should_prune(&running(9, &[(0, 4.0)]), 0, &siblings()));
    assert!(pruner.should_prune(&running(9, &[(0, 3.5)]), 0, &siblings()));
}

#[test]
fn lenient_percentile_keeps_most_trials() {
    let pruner = PercentilePruner::new(90.0, Direction::Minimize);
    assert!(!pruner.should_prune(&running(9, &[(0, 4.5)]), 0, &siblings()));
}

#[test]
#[should_panic(expected = "percentile must be in")]
fn out_of_range_percentile_panics() {
    let _ = PercentilePruner::new(100.0, Direction::Minimize);
}

#[test]
fn trial_without_a_report_at_step_is_kept() {
    let pruner = PercentilePruner::new(25.0, Direction::Minimize);
    assert!(!pruner.should_prune(&running(9, &[(1, 100.0)]), 0, &siblings()));
}
