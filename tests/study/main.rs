#![allow(clippy::cast_precision_loss)]

mod ask_tell;
mod lifecycle;
mod parallel;
mod views;

use hyperstudy::Study;
use hyperstudy::parameter::{FloatParam, SearchSpace};
use hyperstudy::sampler::RandomSampler;

/// A minimizing study over `x` in `[-5, 5]` with a seeded sampler.
fn quadratic_study() -> (Study, FloatParam) {
    let x = FloatParam::new("x", -5.0, 5.0);
    let study = Study::builder()
        .space(SearchSpace::new().with(&x))
        .sampler(RandomSampler::with_seed(42))
        .build()
        .unwrap();
    (study, x)
}
