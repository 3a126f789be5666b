//! Property-based tests for the kd-tree partitioner.
//!
//! Coordinates are drawn from a small integer range so that ties and fully
//! duplicated points occur often.

use std::collections::BTreeSet;

use binsplit_core::partition::partition;
use proptest::prelude::*;

fn point_set() -> impl Strategy<Value = (usize, Vec<Vec<f64>>)> {
    (1usize..200, 1usize..4).prop_flat_map(|(len, dims)| {
        let column = prop::collection::vec((-20i32..20).prop_map(f64::from), len);
        (Just(len), prop::collection::vec(column, dims))
    })
}

fn point(columns: &[Vec<f64>], item: usize) -> Vec<f64> {
    columns.iter().map(|c| c[item]).collect()
}

proptest! {
    /// Every item lands in exactly one bin.
    #[test]
    fn prop_bins_cover_population_disjointly(
        (len, columns) in point_set(),
        leaf_size in 1usize..30,
    ) {
        let result = partition(len, &columns, leaf_size).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut seen = BTreeSet::new();
        for bin in &result.bins {
            prop_assert!(!bin.is_empty());
            for &item in bin {
                prop_assert!(item < len);
                prop_assert!(seen.insert(item), "item {} in two bins", item);
            }
        }
        prop_assert_eq!(seen.len(), len);
        prop_assert!(result.verify(len));
    }

    /// Bins exceed the leaf size only when all their points coincide.
    #[test]
    fn prop_oversized_bins_hold_duplicates_only(
        (len, columns) in point_set(),
        leaf_size in 1usize..30,
    ) {
        let result = partition(len, &columns, leaf_size).map_err(|e| TestCaseError::fail(e.to_string()))?;
        for index in result.oversized() {
            let bin = &result.bins[index];
            prop_assert!(bin.len() > leaf_size);
            let first = point(&columns, bin[0]);
            for &item in &bin[1..] {
                prop_assert_eq!(point(&columns, item), first.clone());
            }
        }
    }

    /// One path per bin, over the alphabet {l, g}, with no path a prefix of another.
    #[test]
    fn prop_paths_identify_leaves(
        (len, columns) in point_set(),
        leaf_size in 1usize..30,
    ) {
        let result = partition(len, &columns, leaf_size).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(result.paths.len(), result.bins.len());
        for (i, a) in result.paths.iter().enumerate() {
            prop_assert!(a.chars().all(|c| c == 'l' || c == 'g'));
            for b in &result.paths[i + 1..] {
                prop_assert!(!a.starts_with(b.as_str()) && !b.starts_with(a.as_str()));
            }
        }
    }

    /// The same input always yields the same partition.
    #[test]
    fn prop_partition_is_deterministic(
        (len, columns) in point_set(),
        leaf_size in 1usize..30,
    ) {
        let a = partition(len, &columns, leaf_size).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let b = partition(len, &columns, leaf_size).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(a, b);
    }
}

#[test]
fn distinct_points_respect_leaf_size() -> binsplit_core::Result<()> {
    let xs: Vec<f64> = (0..1000).map(f64::from).collect();
    let ys: Vec<f64> = (0..1000).map(|i| f64::from((i * 37) % 1000)).collect();
    let result = partition(1000, &[xs, ys], 100)?;
    assert!(result.oversized().is_empty());
    assert!(result.sizes().iter().all(|&s| s <= 100));
    assert!(result.verify(1000));
    Ok(())
}

#[test]
fn all_duplicates_form_one_bin() -> binsplit_core::Result<()> {
    let result = partition(50, &[vec![3.0; 50], vec![-1.0; 50]], 10)?;
    assert_eq!(result.bins.len(), 1);
    assert_eq!(result.paths, vec![String::new()]);
    assert_eq!(result.oversized(), vec![0]);
    Ok(())
}
