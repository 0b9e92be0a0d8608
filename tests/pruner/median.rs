use hyperstudy::Direction;
use hyperstudy::pruner::{MedianPruner, Pruner};

use super::{finished, running};

fn siblings() -> Vec<hyperstudy::Trial> {
    // Values at step 2: [1.0, 2.0, 3.0], median 2.0.
    vec![
        finished(0, &[(0, 0.5), (1, 0.8), (2, 1.0)]),
        finished(1, &[(0, 0.6), (1, 1.5), (2, 2.0)]),
        finished(2, &[(0, 0.7), (1, 2.0), (2, 3.0)]),
    ]
}

#[test]
fn prune_when_worse_than_median_minimize() {
    let pruner = MedianPruner::new(Direction::Minimize);
    let current = running(3, &[(0, 0.5), (1, 1.0), (2, 2.5)]);
    assert!(pruner.should_prune(&current, 2, &siblings()));
}

#[test]
fn keep_when_better_than_median_minimize() {
    let pruner = MedianPruner::new(Direction::Minimize);
    let current = running(3, &[(0, 0.5), (1, 1.0), (2, 1.5)]);
    assert!(!pruner.should_prune(&current, 2, &siblings()));
}

#[test]
fn median_value_itself_is_kept() {
    let pruner = MedianPruner::new(Direction::Minimize);
    let current = running(3, &[(2, 2.0)]);
    assert!(!pruner.should_prune(&current, 2, &siblings()));
}

#[test]
fn prune_when_worse_than_median_maximize() {
    let pruner = MedianPruner::new(Direction::Maximize);
    // Values at step 2: [1.0, 2.0, 3.0]; 1.5 is below the median.
    let current = running(3, &[(2, 1.5)]);
    assert!(pruner.should_prune(&current, 2, &siblings()));

    let current = running(3, &[(2, 2.5)]);
    assert!(!pruner.should_prune(&current, 2, &siblings()));
}

#[test]
fn warmup_steps_are_never_pruned() {
    let pruner = MedianPruner::new(Direction::Minimize).n_warmup_steps(3);
    let current = running(3, &[(2, 100.0)]);
    assert!(!pruner.should_prune(&current, 2, &siblings()));
}

#[test]
fn too_few_siblings_never_prune() {
    let pruner = MedianPruner::new(Direction::Minimize).n_min_trials(4);
    let current = running(3, &[(2, 100.0)]);
    assert!(!pruner.should_prune(&current, 2, &siblings()));
}

#[test]
fn unfinished_siblings_are_ignored() {
    let pruner = MedianPruner::new(Direction::Minimize);
    let current = running(3, &[(0, 100.0)]);
    let others = vec![running(0, &[(0, 1.0)]), running(1, &[(0, 2.0)])];
    assert!(!pruner.should_prune(&current, 0, &others));
}
