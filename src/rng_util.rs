/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Derive an independent generator for one trial from a sampler seed.
///
/// Uses the `SplitMix64` finalizer so that neighbouring ids give unrelated
/// streams.
pub(crate) fn trial_rng(seed: u64, trial_id: u64) -> fastrand::Rng {
    let mut z = seed ^ trial_id.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    fastrand::Rng::with_seed(z ^ (z >> 31))
}
