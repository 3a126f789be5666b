//! Property-based tests for tie-breaking noise.

use binsplit_core::noise;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    /// Every noise component lies within half the smallest gap.
    #[test]
    fn prop_noise_is_bounded_by_half_gap(
        values in prop::collection::vec((-1000i32..1000).prop_map(|v| f64::from(v) / 4.0), 2..200),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let generated = noise::generate(&values, &mut rng);
        prop_assert_eq!(generated.values.len(), values.len());
        match noise::min_gap(&values) {
            Some(gap) => {
                prop_assert_eq!(generated.magnitude, gap / 2.0);
                for u in &generated.values {
                    prop_assert!(u.abs() <= gap / 2.0, "|{}| exceeds {}", u, gap / 2.0);
                }
            }
            None => prop_assert!(generated.values.iter().all(|u| *u == 0.0)),
        }
    }

    /// Noise never reorders values that were strictly ordered.
    #[test]
    fn prop_noise_preserves_strict_order(
        values in prop::collection::btree_set(-500i32..500, 2..100),
        seed in any::<u64>(),
    ) {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let noised = noise::inject(&values, true, &mut rng);
        prop_assert!(noised.values.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn disabled_noise_keeps_unique_attribute_at_full_uniqueness() {
    let values: Vec<f64> = (0..100).map(f64::from).collect();
    let mut rng = StdRng::seed_from_u64(7);
    let noised = noise::inject(&values, false, &mut rng);
    assert_eq!(noised.values, values);
    assert!(noised.noise.is_none());
    assert_eq!(noised.uniqueness, 1.0);
}

#[test]
fn noise_breaks_ties() {
    let values: Vec<f64> = (0..200).map(|i| f64::from(i % 10)).collect();
    assert_eq!(noise::uniqueness(&values), 0.05);
    let mut rng = StdRng::seed_from_u64(11);
    let noised = noise::inject(&values, true, &mut rng);
    assert_eq!(noised.uniqueness, 1.0);
}

#[test]
fn constant_attribute_gets_zero_noise() {
    let mut rng = StdRng::seed_from_u64(3);
    let noised = noise::inject(&[2.5; 8], true, &mut rng);
    assert_eq!(noised.values, vec![2.5; 8]);
    assert_eq!(noised.noise.map(|n| n.magnitude), Some(0.0));
}
