//! Random sampler implementation.

use crate::distribution::Distribution;
use crate::param::{ParamValue, Params};
use crate::parameter::SearchSpace;
use crate::rng_util;
use crate::sampler::Sampler;
use crate::trial::Trial;

/// A simple random sampler that samples uniformly from distributions.
///
/// This sampler ignores the trial history and samples uniformly at random,
/// respecting log scale and step size constraints. It serves as a baseline
/// sampler and is the study default.
///
/// Each trial draws from its own generator derived from the sampler seed and
/// the trial id, so a seeded study reproduces the same assignments even when
/// workers ask concurrently and in a different order.
///
/// # Examples
///
/// ```
/// use hyperstudy::sampler::RandomSampler;
///
/// // Create with a random seed
/// let sampler = RandomSampler::new();
///
/// // Create with a fixed seed for reproducibility
/// let sampler = RandomSampler::with_seed(42);
/// ```
pub struct RandomSampler {
    seed: u64,
}

impl RandomSampler {
    /// Creates a new random sampler with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seed: fastrand::u64(..),
        }
    }

    /// Creates a new random sampler with a fixed seed for reproducibility.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    fn suggest(&self, space: &SearchSpace, trial_id: u64, _history: &[Trial]) -> Params {
        let mut rng = rng_util::trial_rng(self.seed, trial_id);
        space
            .iter()
            .map(|(name, dist)| (name.to_string(), sample_one(&mut rng, dist)))
            .collect()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn sample_one(rng: &mut fastrand::Rng, distribution: &Distribution) -> ParamValue {
    match distribution {
        Distribution::Float(d) => {
            let value = if let Some(step) = d.step {
                // Sample from step grid
                let n_steps = ((d.high - d.low) / step).floor() as i64;
                let k = rng.i64(0..=n_steps);
                // Rounding can push the last grid point past `high`
                (d.low + (k as f64) * step).clamp(d.low, d.high)
            } else if d.log_scale {
                // Sample uniformly in log space
                let log_value = rng_util::f64_range(rng, d.low.ln(), d.high.ln());
                log_value.exp().clamp(d.low, d.high)
            } else {
                rng_util::f64_range(rng, d.low, d.high)
            };
            ParamValue::Float(value)
        }
        Distribution::Int(d) => {
            let value = if let Some(step) = d.step {
                // i128 keeps ranges wider than i64::MAX from overflowing
                let n_steps = (i128::from(d.high) - i128::from(d.low)) / i128::from(step);
                let k = rng.u64(0..=u64::try_from(n_steps).unwrap_or(0));
                let raw = i128::from(d.low) + i128::from(k) * i128::from(step);
                i64::try_from(raw).map_or(d.high, |v| v.clamp(d.low, d.high))
            } else if d.log_scale {
                // Sample uniformly in log space, then round
                let log_low = (d.low as f64).ln();
                let log_high = (d.high as f64).ln();
                let log_value = rng_util::f64_range(rng, log_low, log_high);
                let raw = log_value.exp().round() as i64;
                // Clamp to bounds since rounding might push outside
                raw.clamp(d.low, d.high)
            } else {
                rng.i64(d.low..=d.high)
            };
            ParamValue::Int(value)
        }
        Distribution::Categorical(d) => {
            let index = rng.usize(0..d.choices.len());
            ParamValue::Categorical(d.choices[index].clone())
        }
        Distribution::Bool => ParamValue::Bool(rng.bool()),
    }
}
