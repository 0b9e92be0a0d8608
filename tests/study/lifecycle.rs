use hyperstudy::{Direction, Error, Study, TrialState};

use super::quadratic_study;

#[test]
fn repeated_step_is_rejected_and_history_kept() {
    let (study, _) = quadratic_study();
    let mut trial = study.ask().unwrap();

    trial.report(1, 0.3).unwrap();
    let err = trial.report(1, 0.4).unwrap_err();
    assert!(matches!(
        err,
        Error::NonMonotonicStep {
            step: 1,
            last_step: 1,
            ..
        }
    ));

    let snapshot = trial.snapshot();
    assert_eq!(snapshot.intermediate_reports(), &[(1, 0.3)]);
    assert_eq!(snapshot.state(), TrialState::Running);
}

#[test]
fn decreasing_step_is_rejected() {
    let (study, _) = quadratic_study();
    let mut trial = study.ask().unwrap();
    trial.report(10, 1.0).unwrap();
    assert!(matches!(
        trial.report(3, 0.9),
        Err(Error::NonMonotonicStep { step: 3, last_step: 10, .. })
    ));
}

#[test]
fn terminal_trials_reject_every_mutation() {
    let (study, _) = quadratic_study();
    let id = study.ask().unwrap().id();
    study.complete(id, 1.0).unwrap();

    assert!(matches!(
        study.report(id, 0, 1.0),
        Err(Error::InvalidState {
            state: TrialState::Complete,
            operation: "report",
            ..
        })
    ));
    assert!(matches!(
        study.complete(id, 2.0),
        Err(Error::InvalidState { .. })
    ));
    assert!(matches!(study.fail(id, "late"), Err(Error::InvalidState { .. })));
    assert_eq!(study.trial(id).unwrap().value(), Some(1.0));
}

#[test]
fn value_count_mismatch_leaves_trial_running() {
    let study = Study::builder()
        .directions([Direction::Minimize, Direction::Maximize])
        .build()
        .unwrap();
    let id = study.ask().unwrap().id();

    assert!(matches!(
        study.complete(id, 1.0),
        Err(Error::ValueCountMismatch {
            expected: 2,
            got: 1
        })
    ));
    assert_eq!(study.trial(id).unwrap().state(), TrialState::Running);

    study.complete(id, [1.0, 2.0]).unwrap();
    assert_eq!(study.trial(id).unwrap().values(), Some(&[1.0, 2.0][..]));
}

#[test]
fn nan_is_rejected() {
    let (study, _) = quadratic_study();
    let mut trial = study.ask().unwrap();
    assert!(matches!(trial.report(0, f64::NAN), Err(Error::InvalidValue(_))));
    assert!(trial.snapshot().intermediate_reports().is_empty());

    let id = trial.id();
    assert!(matches!(
        study.complete(id, f64::NAN),
        Err(Error::InvalidValue(_))
    ));
    assert_eq!(study.running_count(), 1);
}

#[test]
fn abandon_running_closes_only_running_trials() {
    let (study, _) = quadratic_study();
    let done = study.ask().unwrap();
    let left_a = study.ask().unwrap().id();
    let left_b = study.ask().unwrap().id();
    done.complete(1.0).unwrap();

    assert_eq!(study.abandon_running().unwrap(), vec![left_a, left_b]);
    assert_eq!(study.count(TrialState::Abandoned), 2);
    assert_eq!(study.running_count(), 0);
    assert_eq!(study.completed_count(), 1);

    let abandoned = study.trial(left_a).unwrap();
    assert!(abandoned.finished_at().is_some());
    assert_eq!(abandoned.values(), None);

    assert!(study.abandon_running().unwrap().is_empty());
}
