use hyperstudy::{Error, Study, TrialState};

fn seeded(values: &[f64], maximize: bool) -> Study {
    let builder = Study::builder();
    let builder = if maximize {
        builder.maximize()
    } else {
        builder.minimize()
    };
    let study = builder.build().unwrap();
    for &value in values {
        study.ask().unwrap().complete(value).unwrap();
    }
    study
}

#[test]
fn best_follows_the_direction() {
    let values = [5.0, 3.0, 4.0, 2.0, 6.0];
    let min = seeded(&values, false);
    assert_eq!(min.best_value().unwrap(), 2.0);
    assert_eq!(min.best_trial().unwrap().id(), 3);

    let max = seeded(&values, true);
    assert_eq!(max.best_value().unwrap(), 6.0);
    assert_eq!(max.best_trial().unwrap().id(), 4);
}

#[test]
fn best_ignores_unfinished_trials() {
    let study = seeded(&[5.0], false);
    let mut running = study.ask().unwrap();
    running.report(0, 0.1).unwrap();
    let failed = study.ask().unwrap();
    failed.fail("crashed").unwrap();

    assert_eq!(study.best_trial().unwrap().id(), 0);
    assert_eq!(study.convergence_series().unwrap(), vec![5.0]);
}

#[test]
fn empty_study_has_no_best() {
    let study = Study::builder().build().unwrap();
    assert!(matches!(study.best_trial(), Err(Error::NoCompletedTrials)));
    assert!(matches!(study.best_params(), Err(Error::NoCompletedTrials)));
    assert!(study.top_trials(3).unwrap().is_empty());
    assert!(study.convergence_series().unwrap().is_empty());
}

#[test]
fn top_trials_are_sorted_best_first() {
    let study = seeded(&[5.0, 3.0, 4.0, 2.0, 6.0], false);
    let top: Vec<f64> = study
        .top_trials(3)
        .unwrap()
        .iter()
        .filter_map(|t| t.value())
        .collect();
    assert_eq!(top, vec![2.0, 3.0, 4.0]);
    assert_eq!(study.top_trials(10).unwrap().len(), 5);
}

#[test]
fn counts_track_every_state() {
    let study = seeded(&[1.0, 2.0], false);
    let a = study.ask().unwrap();
    let b = study.ask().unwrap();
    let c = study.ask().unwrap();
    let _left_running = study.ask().unwrap();
    study.prune(a.id()).unwrap();
    b.fail("oom").unwrap();
    c.complete(0.5).unwrap();

    assert_eq!(study.n_trials(), 6);
    assert_eq!(study.completed_count(), 3);
    assert_eq!(study.pruned_count(), 1);
    assert_eq!(study.failed_count(), 1);
    assert_eq!(study.running_count(), 1);
    assert_eq!(study.count(TrialState::Abandoned), 0);
}

#[test]
fn convergence_series_from_study() {
    let study = seeded(&[5.0, 3.0, 4.0, 2.0, 6.0], false);
    assert_eq!(
        study.convergence_series().unwrap(),
        vec![5.0, 3.0, 3.0, 2.0, 2.0]
    );
}
