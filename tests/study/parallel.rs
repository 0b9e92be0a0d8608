use std::collections::BTreeSet;
use std::sync::Arc;

use hyperstudy::{Error, RunningTrial, Study, Trial};

use super::quadratic_study;

#[test]
fn parallel_optimization_respects_the_budget() {
    let (study, x) = quadratic_study();
    study
        .optimize_parallel(40, 4, |trial: &mut RunningTrial<'_>| {
            let v = trial.get(&x)?;
            for step in 0..3 {
                trial.report(step, v * v + 1.0 / (step as f64 + 1.0))?;
            }
            Ok::<_, Error>(v * v)
        })
        .unwrap();

    let trials = study.trials();
    assert_eq!(trials.len(), 40);
    let ids: BTreeSet<u64> = trials.iter().map(Trial::id).collect();
    assert_eq!(ids, (0..40).collect());
    assert_eq!(study.completed_count(), 40);
    for trial in &trials {
        assert_eq!(trial.intermediate_reports().len(), 3);
    }
}

#[test]
fn concurrent_asks_get_unique_ids() {
    let study = Arc::new(Study::builder().build().unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let study = Arc::clone(&study);
            std::thread::spawn(move || {
                (0..25)
                    .map(|i| {
                        let trial = study.ask().unwrap();
                        let id = trial.id();
                        trial.complete(f64::from(i)).unwrap();
                        id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "trial id {id} was handed out twice");
        }
    }
    assert_eq!(ids.len(), 200);
    assert_eq!(ids.last(), Some(&199));
    assert_eq!(study.completed_count(), 200);
}

#[test]
fn protocol_errors_in_the_objective_fail_their_trials() {
    let study = Study::builder().build().unwrap();
    let result = study.optimize_parallel(100, 4, |trial: &mut RunningTrial<'_>| {
        trial.report(0, 1.0)?;
        // Repeated step; propagating it fails this trial only.
        trial.report(0, 1.0)?;
        Ok::<_, Error>(1.0)
    });

    assert!(result.is_ok());
    assert_eq!(study.failed_count(), 100);
    assert_eq!(study.running_count(), 0);
}
