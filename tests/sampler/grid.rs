use std::collections::BTreeSet;

use hyperstudy::distribution::{FloatDistribution, IntDistribution};
use hyperstudy::parameter::{BoolParam, CategoricalParam, FloatParam, IntParam, SearchSpace};
use hyperstudy::sampler::grid::{float_grid_points, int_grid_points};
use hyperstudy::sampler::{GridSampler, Sampler};
use hyperstudy::{Error, RunningTrial, Study};

#[test]
fn grid_visits_every_combination_once() {
    let depth = IntParam::new("depth", 1, 3);
    let act = CategoricalParam::new("act", ["relu", "tanh"]);
    let bias = BoolParam::new("bias");
    let space = SearchSpace::new().with(&depth).with(&act).with(&bias);
    let sampler = GridSampler::new();
    assert_eq!(sampler.grid_size(&space), 12);

    let study = Study::builder().space(space).sampler(sampler).build().unwrap();
    study
        .optimize(12, |_: &mut RunningTrial<'_>| Ok::<_, Error>(0.0))
        .unwrap();

    let combos: BTreeSet<(i64, String, bool)> = study
        .trials()
        .iter()
        .map(|t| {
            (
                t.get(&depth).unwrap(),
                t.get(&act).unwrap(),
                t.get(&bias).unwrap(),
            )
        })
        .collect();
    assert_eq!(combos.len(), 12);
}

#[test]
fn last_parameter_varies_fastest() {
    let space = SearchSpace::new()
        .with(&IntParam::new("a", 0, 1))
        .with(&IntParam::new("b", 0, 2));
    let sampler = GridSampler::new();

    let points: Vec<(i64, i64)> = (0..6)
        .map(|id| {
            let p = sampler.suggest(&space, id, &[]);
            (p["a"].as_i64().unwrap(), p["b"].as_i64().unwrap())
        })
        .collect();
    assert_eq!(
        points,
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
    );
}

#[test]
fn grid_cycles_after_exhaustion() {
    let space = SearchSpace::new().with(&BoolParam::new("flag"));
    let sampler = GridSampler::new();
    assert_eq!(sampler.suggest(&space, 0, &[]), sampler.suggest(&space, 2, &[]));
    assert_eq!(sampler.suggest(&space, 1, &[]), sampler.suggest(&space, 5, &[]));
}

#[test]
fn continuous_axes_use_the_configured_resolution() {
    let x = FloatParam::new("x", 0.0, 1.0);
    let space = SearchSpace::new().with(&x);
    let sampler = GridSampler::new().n_points_per_param(5);
    assert_eq!(sampler.grid_size(&space), 5);

    let xs: Vec<f64> = (0..5)
        .map(|id| sampler.suggest(&space, id, &[])["x"].as_f64().unwrap())
        .collect();
    assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn int_points_respect_step_and_log_scale() {
    let stepped = IntDistribution {
        low: 0,
        high: 10,
        log_scale: false,
        step: Some(4),
    };
    assert_eq!(int_grid_points(&stepped, 10), vec![0, 4, 8]);

    let log = IntDistribution {
        low: 1,
        high: 1000,
        log_scale: true,
        step: None,
    };
    assert_eq!(int_grid_points(&log, 4), vec![1, 10, 100, 1000]);

    let narrow = IntDistribution {
        low: 1,
        high: 3,
        log_scale: false,
        step: None,
    };
    // Rounding collapses duplicates.
    assert_eq!(int_grid_points(&narrow, 10), vec![1, 2, 3]);
}

#[test]
fn float_points_with_step() {
    let dist = FloatDistribution {
        low: 0.0,
        high: 1.0,
        log_scale: false,
        step: Some(0.3),
    };
    let points = float_grid_points(&dist, 10);
    assert_eq!(points.len(), 4);
    assert!((points[3] - 0.9).abs() < 1e-12);
}
