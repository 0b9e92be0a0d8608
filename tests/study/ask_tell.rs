use hyperstudy::{Error, PruneDecision, TrialState};

use super::quadratic_study;

#[test]
fn ask_and_tell_basic() {
    let (study, x) = quadratic_study();

    for _ in 0..10 {
        let trial = study.ask().unwrap();
        let v = trial.get(&x).unwrap();
        study.tell(trial.id(), Ok::<_, &str>(v * v)).unwrap();
    }

    assert_eq!(study.n_trials(), 10);
    assert_eq!(study.completed_count(), 10);
    assert!(study.best_value().unwrap() >= 0.0);
}

#[test]
fn ask_and_tell_with_failures() {
    let (study, x) = quadratic_study();

    for i in 0..10 {
        let trial = study.ask().unwrap();
        let v = trial.get(&x).unwrap();
        if i % 2 == 0 {
            study.tell(trial.id(), Ok::<_, &str>(v * v)).unwrap();
        } else {
            study
                .tell(trial.id(), Err::<f64, _>("simulated failure"))
                .unwrap();
        }
    }

    // Failed trials stay in the history.
    assert_eq!(study.n_trials(), 10);
    assert_eq!(study.completed_count(), 5);
    assert_eq!(study.failed_count(), 5);
    let failed = study.trial(1).unwrap();
    assert_eq!(failed.fail_reason(), Some("simulated failure"));
    assert_eq!(failed.values(), None);
}

#[test]
fn handle_methods_finalize_the_record() {
    let (study, _) = quadratic_study();

    let mut trial = study.ask().unwrap();
    assert_eq!(trial.report(0, 3.0).unwrap(), PruneDecision::Continue);
    assert_eq!(trial.report(5, 1.0).unwrap(), PruneDecision::Continue);
    assert_eq!(trial.state(), TrialState::Running);
    trial.complete(0.5).unwrap();

    let record = study.trial(0).unwrap();
    assert_eq!(record.state(), TrialState::Complete);
    assert_eq!(record.values(), Some(&[0.5][..]));
    assert_eq!(record.intermediate_reports(), &[(0, 3.0), (5, 1.0)]);
    assert!(record.finished_at().is_some());
}

#[test]
fn by_id_operations_work_while_a_handle_is_held() {
    let (study, _) = quadratic_study();
    let trial = study.ask().unwrap();

    study.report(trial.id(), 1, 0.7).unwrap();
    assert_eq!(trial.snapshot().last_step(), Some(1));

    study.fail(trial.id(), "killed externally").unwrap();
    assert_eq!(trial.state(), TrialState::Failed);
    assert!(matches!(
        trial.complete(1.0),
        Err(Error::InvalidState {
            state: TrialState::Failed,
            operation: "complete",
            ..
        })
    ));
}

#[test]
fn manual_prune_bypasses_the_pruner() {
    let (study, _) = quadratic_study();
    let trial = study.ask().unwrap();
    study.report(trial.id(), 0, 1.0).unwrap();
    study.prune(trial.id()).unwrap();

    assert!(trial.is_pruned());
    assert_eq!(study.pruned_count(), 1);
    assert!(matches!(
        study.prune(trial.id()),
        Err(Error::InvalidState { .. })
    ));
}
