use hyperstudy::pruner::{Pruner, ThresholdPruner};

use super::running;

#[test]
fn prunes_outside_the_bounds() {
    let pruner = ThresholdPruner::new().lower(0.0).upper(10.0);
    assert!(pruner.should_prune(&running(0, &[(0, 10.5)]), 0, &[]));
    assert!(pruner.should_prune(&running(0, &[(0, -0.1)]), 0, &[]));
    assert!(!pruner.should_prune(&running(0, &[(0, 5.0)]), 0, &[]));
}

#[test]
fn boundary_values_are_kept() {
    let pruner = ThresholdPruner::new().lower(0.0).upper(10.0);
    assert!(!pruner.should_prune(&running(0, &[(0, 10.0)]), 0, &[]));
    assert!(!pruner.should_prune(&running(0, &[(0, 0.0)]), 0, &[]));
}

#[test]
fn only_the_latest_report_counts() {
    let pruner = ThresholdPruner::new().upper(1.0);
    let trial = running(0, &[(0, 50.0), (1, 0.5)]);
    assert!(!pruner.should_prune(&trial, 1, &[]));
}

#[test]
fn infinite_values_are_always_pruned() {
    let pruner = ThresholdPruner::new();
    assert!(pruner.should_prune(&running(0, &[(0, f64::INFINITY)]), 0, &[]));
    assert!(pruner.should_prune(&running(0, &[(0, f64::NEG_INFINITY)]), 0, &[]));
    assert!(!pruner.should_prune(&running(0, &[(0, 1e300)]), 0, &[]));
}

#[test]
fn warmup_delays_pruning() {
    let pruner = ThresholdPruner::new().upper(1.0).n_warmup_steps(2);
    assert!(!pruner.should_prune(&running(0, &[(1, 5.0)]), 1, &[]));
    assert!(pruner.should_prune(&running(0, &[(1, 5.0), (2, 5.0)]), 2, &[]));
}
