use hyperstudy::parameter::{BoolParam, CategoricalParam, FloatParam, IntParam, SearchSpace};
use hyperstudy::sampler::{RandomSampler, Sampler};
use hyperstudy::{Error, ParamValue, Params, RunningTrial, Study};

#[test]
fn uniform_float_distribution() {
    let x = FloatParam::new("x", 0.0, 1.0);
    let space = SearchSpace::new().with(&x);
    let sampler = RandomSampler::with_seed(42);

    let n_samples = 1000;
    let mut samples: Vec<f64> = (0..n_samples)
        .map(|id| {
            sampler.suggest(&space, id, &[])["x"]
                .as_f64()
                .unwrap()
        })
        .collect();

    for &s in &samples {
        assert!((0.0..=1.0).contains(&s), "sample {s} out of range [0, 1]");
    }

    samples.sort_by(f64::total_cmp);
    let q1 = samples[250];
    let q2 = samples[500];
    let q3 = samples[750];
    assert!((q1 - 0.25).abs() < 0.1, "Q1 {q1} should be close to 0.25");
    assert!((q2 - 0.5).abs() < 0.1, "median {q2} should be close to 0.5");
    assert!((q3 - 0.75).abs() < 0.1, "Q3 {q3} should be close to 0.75");
}

#[test]
fn uniform_int_distribution_hits_every_value() {
    let n = IntParam::new("n", 1, 10);
    let space = SearchSpace::new().with(&n);
    let sampler = RandomSampler::with_seed(123);

    let mut counts = [0u32; 10];
    for id in 0..5000 {
        let v = sampler.suggest(&space, id, &[])["n"].as_i64().unwrap();
        assert!((1..=10).contains(&v));
        counts[usize::try_from(v - 1).unwrap()] += 1;
    }
    for (i, &c) in counts.iter().enumerate() {
        assert!(c > 350 && c < 650, "value {} drawn {c} times", i + 1);
    }
}

#[test]
fn log_and_stepped_parameters_stay_admissible() {
    let lr = FloatParam::new("lr", 1e-5, 1e-1).log_scale();
    let units = IntParam::new("units", 32, 512).step(32);
    let dropout = FloatParam::new("dropout", 0.0, 0.5).step(0.1);
    let study = Study::builder()
        .space(SearchSpace::new().with(&lr).with(&units).with(&dropout))
        .sampler(RandomSampler::with_seed(9))
        .build()
        .unwrap();

    let mut small_lr = 0;
    study
        .optimize(300, |trial: &mut RunningTrial<'_>| {
            let lr_v = trial.get(&lr)?;
            let units_v = trial.get(&units)?;
            let dropout_v = trial.get(&dropout)?;
            assert!((1e-5..=1e-1).contains(&lr_v));
            assert_eq!(units_v % 32, 0);
            let k = (dropout_v / 0.1).round();
            assert!((dropout_v - k * 0.1).abs() < 1e-9);
            Ok::<_, Error>(lr_v)
        })
        .unwrap();

    // Log scale puts half the mass below the geometric midpoint 1e-3.
    for trial in study.trials() {
        if trial.get(&lr).unwrap() < 1e-3 {
            small_lr += 1;
        }
    }
    assert!(small_lr > 100, "only {small_lr} of 300 below 1e-3");
}

#[test]
fn categorical_and_bool_cover_all_choices() {
    let act = CategoricalParam::new("act", ["relu", "gelu", "tanh"]);
    let bias = BoolParam::new("bias");
    let space = SearchSpace::new().with(&act).with(&bias);
    let sampler = RandomSampler::with_seed(1);

    let mut seen_act = std::collections::BTreeSet::new();
    let mut seen_bias = std::collections::BTreeSet::new();
    for id in 0..200 {
        let params = sampler.suggest(&space, id, &[]);
        seen_act.insert(params["act"].as_str().unwrap().to_string());
        seen_bias.insert(params["bias"].as_bool().unwrap());
    }
    assert_eq!(seen_act.len(), 3);
    assert_eq!(seen_bias.len(), 2);
}

#[test]
fn same_seed_and_trial_id_give_the_same_assignment() {
    let space = SearchSpace::new()
        .with(&FloatParam::new("x", -1.0, 1.0))
        .with(&IntParam::new("n", 0, 100));
    let a = RandomSampler::with_seed(77);
    let b = RandomSampler::with_seed(77);

    for id in 0..20 {
        assert_eq!(a.suggest(&space, id, &[]), b.suggest(&space, id, &[]));
    }
    assert_ne!(a.suggest(&space, 0, &[]), a.suggest(&space, 1, &[]));
    assert_ne!(
        a.suggest(&space, 0, &[]),
        RandomSampler::with_seed(78).suggest(&space, 0, &[])
    );
}

#[test]
fn seeded_studies_are_reproducible() {
    let x = FloatParam::new("x", -3.0, 3.0);
    let run = || {
        let study = Study::builder()
            .space(SearchSpace::new().with(&x))
            .sampler(RandomSampler::with_seed(2024))
            .build()
            .unwrap();
        study
            .optimize(15, |trial: &mut RunningTrial<'_>| {
                Ok::<_, Error>(trial.get(&x)?.powi(2))
            })
            .unwrap();
        study
            .trials()
            .iter()
            .map(|t| t.get(&x).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn inexact_float_steps_never_overshoot_the_upper_bound() {
    let spaces = [
        FloatParam::new("x", 0.3, 0.9).step(0.2),
        FloatParam::new("x", 0.1, 0.7).step(0.3),
        FloatParam::new("x", 0.0, 0.3).step(0.1),
        FloatParam::new("x", -0.9, -0.3).step(0.2),
        FloatParam::new("x", 1.1, 2.2).step(0.55),
    ];
    let sampler = RandomSampler::with_seed(5);
    for x in &spaces {
        let space = SearchSpace::new().with(x);
        for id in 0..500 {
            let params = sampler.suggest(&space, id, &[]);
            space.check(&params).unwrap();
        }
    }

    let x = FloatParam::new("x", 0.3, 0.9).step(0.2);
    let study = Study::builder()
        .space(SearchSpace::new().with(&x))
        .sampler(RandomSampler::with_seed(1))
        .build()
        .unwrap();
    study
        .optimize(200, |trial: &mut RunningTrial<'_>| {
            let v = trial.get(&x)?;
            assert!((0.3..=0.9).contains(&v));
            Ok::<_, Error>(v)
        })
        .unwrap();
    assert_eq!(study.n_trials(), 200);
}

#[test]
fn full_width_int_step_range_samples_on_grid() {
    let n = IntParam::new("n", i64::MIN, i64::MAX).step(2);
    let space = SearchSpace::new().with(&n);
    let sampler = RandomSampler::with_seed(8);
    for id in 0..200 {
        let params = sampler.suggest(&space, id, &[]);
        space.check(&params).unwrap();
        let v = params["n"].as_i64().unwrap();
        assert_eq!((i128::from(v) - i128::from(i64::MIN)) % 2, 0);
    }

    let off_grid = Params::from([("n".to_string(), ParamValue::Int(i64::MAX))]);
    assert!(matches!(
        space.check(&off_grid),
        Err(Error::ParameterConstraint { .. })
    ));

    let study = Study::builder().space(space).build().unwrap();
    let trial = study.ask().unwrap();
    assert!(trial.get(&n).is_ok());
}
