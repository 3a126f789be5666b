//! Tie-breaking noise for selection attributes.
//!
//! Each value is moved by at most half of the smallest gap between distinct
//! values, so the sorted order of distinct values is preserved while
//! duplicated values are (almost surely) separated.

use log::warn;
use rand::Rng;

/// A generated noise vector together with the magnitude it was drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseVector {
    /// Per-item perturbation `u_i`.
    pub values: Vec<f64>,
    /// Half of the minimum gap; every `|u_i|` is at most this.
    pub magnitude: f64,
}

/// An attribute after optional noise injection.
#[derive(Debug, Clone, PartialEq)]
pub struct Noised {
    /// Perturbed (or untouched) values.
    pub values: Vec<f64>,
    /// The noise that was added, if any.
    pub noise: Option<NoiseVector>,
    /// Distinct-value ratio of `values`.
    pub uniqueness: f64,
}

/// Smallest positive gap between sorted distinct values.
///
/// Returns `None` when fewer than two distinct values exist. NaN entries are
/// ignored.
pub fn min_gap(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .min_by(f64::total_cmp)
}

/// Ratio of distinct values to total values (1.0 for an empty slice).
pub fn uniqueness(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|a, b| a.total_cmp(b).is_eq());
    sorted.len() as f64 / values.len() as f64
}

/// Draws `u_i` uniformly from `[-g/2, +g/2]` for every value.
///
/// An attribute with a single distinct value has no gap, and one whose gap
/// overflows `f64` has no usable magnitude; both get an all-zero vector and
/// a warning.
pub fn generate<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> NoiseVector {
    let Some(gap) = min_gap(values) else {
        warn!(
            "attribute has fewer than two distinct values; noise of magnitude 0 applied to {} items",
            values.len()
        );
        return zero_noise(values.len());
    };
    let magnitude = gap / 2.0;
    if !magnitude.is_finite() {
        warn!(
            "minimum gap {gap} is not finite; noise of magnitude 0 applied to {} items",
            values.len()
        );
        return zero_noise(values.len());
    }
    let noise = (0..values.len())
        .map(|_| rng.gen_range(-magnitude..=magnitude))
        .collect();
    NoiseVector {
        values: noise,
        magnitude,
    }
}

fn zero_noise(len: usize) -> NoiseVector {
    NoiseVector {
        values: vec![0.0; len],
        magnitude: 0.0,
    }
}

/// Adds a previously generated noise vector to `values`.
///
/// Lengths must match; the caller checks this when loading persisted noise.
pub fn apply(values: &[f64], noise: &NoiseVector) -> Noised {
    let perturbed: Vec<f64> = values
        .iter()
        .zip(&noise.values)
        .map(|(v, u)| v + u)
        .collect();
    finish(perturbed, Some(noise.clone()))
}

/// Injects fresh noise into `values` when `enabled`, otherwise returns them unchanged.
pub fn inject<R: Rng + ?Sized>(values: &[f64], enabled: bool, rng: &mut R) -> Noised {
    if !enabled {
        return finish(values.to_vec(), None);
    }
    let noise = generate(values, rng);
    apply(values, &noise)
}

fn finish(values: Vec<f64>, noise: Option<NoiseVector>) -> Noised {
    let ratio = uniqueness(&values);
    if ratio < 1.0 {
        warn!(
            "uniqueness after noise is {ratio:.6} ({} items); duplicate values remain",
            values.len()
        );
    }
    Noised {
        values,
        noise,
        uniqueness: ratio,
    }
}
