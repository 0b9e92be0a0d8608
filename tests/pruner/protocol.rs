use std::sync::Arc;

use hyperstudy::pruner::Pruner;
use hyperstudy::{Error, PruneDecision, RunningTrial, Study, Trial, TrialState};

struct Always;

impl Pruner for Always {
    fn should_prune(&self, _trial: &Trial, _step: u64, _siblings: &[Trial]) -> bool {
        true
    }
}

#[test]
fn always_prune_prunes_every_reporting_trial() {
    let study = Study::builder().pruner(Always).build().unwrap();

    study
        .optimize(10, |trial: &mut RunningTrial<'_>| {
            // Trials 0, 2, 4, ... never report.
            if trial.id() % 2 == 1 {
                for step in 0..5 {
                    if trial.report(step, 1.0)?.is_prune() {
                        break;
                    }
                }
            }
            Ok::<_, Error>(1.0)
        })
        .unwrap();

    assert_eq!(study.pruned_count(), 5);
    assert_eq!(study.completed_count(), 5);
    for trial in study.trials() {
        if trial.state() == TrialState::Pruned {
            // Pruned right after the first report.
            assert_eq!(trial.intermediate_reports(), &[(0, 1.0)]);
        }
    }
}

#[test]
fn always_prune_leaves_nothing_complete_when_everyone_reports() {
    let study = Study::builder().pruner(Always).build().unwrap();
    study
        .optimize(6, |trial: &mut RunningTrial<'_>| {
            trial.report(0, 0.5)?;
            Ok::<_, Error>(0.5)
        })
        .unwrap();

    assert_eq!(study.completed_count(), 0);
    assert_eq!(study.pruned_count(), 6);
}

#[test]
fn pruned_trial_rejects_further_reports() {
    let study = Study::builder().pruner(Always).build().unwrap();
    let mut trial = study.ask().unwrap();
    assert_eq!(trial.report(0, 1.0).unwrap(), PruneDecision::Prune);
    assert!(trial.is_pruned());
    assert!(matches!(
        trial.report(1, 1.0),
        Err(Error::InvalidState {
            state: TrialState::Pruned,
            ..
        })
    ));
}

/// Prunes a trial when any sibling that reached the same step has failed.
struct FailedSiblingPruner;

impl Pruner for FailedSiblingPruner {
    fn should_prune(&self, _trial: &Trial, _step: u64, siblings: &[Trial]) -> bool {
        siblings.iter().any(|t| t.state() == TrialState::Failed)
    }
}

#[test]
fn pruner_sees_siblings_in_every_state() {
    let study = Study::builder().pruner(FailedSiblingPruner).build().unwrap();

    let mut crashed = study.ask().unwrap();
    crashed.report(3, 1.0).unwrap();
    crashed.fail("diverged").unwrap();

    let mut other_step = study.ask().unwrap();
    assert_eq!(other_step.report(2, 1.0).unwrap(), PruneDecision::Continue);

    let mut same_step = study.ask().unwrap();
    same_step.report(1, 1.0).unwrap();
    assert_eq!(same_step.report(3, 1.0).unwrap(), PruneDecision::Prune);
}

/// Records what each call received.
#[derive(Default)]
struct Recording {
    calls: parking_lot::Mutex<Vec<(u64, u64, Vec<u64>)>>,
}

impl Pruner for Recording {
    fn should_prune(&self, trial: &Trial, step: u64, siblings: &[Trial]) -> bool {
        assert_eq!(trial.last_step(), Some(step));
        self.calls.lock().push((
            trial.id(),
            step,
            siblings.iter().map(Trial::id).collect(),
        ));
        false
    }
}

#[test]
fn pruner_gets_the_new_report_and_matching_siblings_only() {
    let recording = Arc::new(Recording::default());
    let study = Study::builder()
        .pruner(SharedPruner(Arc::clone(&recording)))
        .build()
        .unwrap();

    let mut a = study.ask().unwrap();
    let mut b = study.ask().unwrap();
    a.report(0, 1.0).unwrap();
    a.report(1, 1.0).unwrap();
    b.report(1, 2.0).unwrap();
    a.complete(1.0).unwrap();

    let mut c = study.ask().unwrap();
    c.report(0, 3.0).unwrap();

    let calls = recording.calls.lock().clone();
    assert_eq!(
        calls,
        vec![
            (0, 0, vec![]),
            (0, 1, vec![]),
            (1, 1, vec![0]),
            (2, 0, vec![0]),
        ]
    );
}

struct SharedPruner(Arc<Recording>);

impl Pruner for SharedPruner {
    fn should_prune(&self, trial: &Trial, step: u64, siblings: &[Trial]) -> bool {
        self.0.should_prune(trial, step, siblings)
    }
}
