mod median;
mod percentile;
mod protocol;
mod threshold;

use hyperstudy::{Params, Trial};

/// A running trial with the given reports.
fn running(id: u64, reports: &[(u64, f64)]) -> Trial {
    let mut trial = Trial::new(id, Params::new());
    for &(step, value) in reports {
        trial.report(step, value).unwrap();
    }
    trial
}

/// A completed single-objective trial with the given reports.
fn finished(id: u64, reports: &[(u64, f64)]) -> Trial {
    let mut trial = running(id, reports);
    trial.complete(vec![0.0], 1).unwrap();
    trial
}
