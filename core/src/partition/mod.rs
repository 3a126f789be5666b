//! Spatial partition of a population into kd-tree leaf bins.
//!
//! Attribute columns are min-max normalized, a sliding-midpoint kd-tree is
//! built over them, and the leaves are flattened depth-first (less before
//! greater) into an ordered list of bins plus one `l`/`g` split path per bin.
//!
//! # Invariant
//!
//! Bins are pairwise disjoint and their union is exactly `0..N`.
//!
//! # Examples
//!
//! ```
//! use binsplit_core::partition::partition;
//!
//! let degree = vec![1.0, 9.0, 2.0, 8.0, 5.0, 3.0];
//! let p = partition(6, &[degree], 2).unwrap();
//! assert!(p.verify(6));
//! assert!(p.bins.iter().all(|b| b.len() <= 2));
//! assert_eq!(p.bins.len(), p.paths.len());
//! ```

pub mod kdtree;

use log::warn;

use crate::error::{Error, Result};
pub use kdtree::{KdTree, Node, PointSet};

/// Ordered leaf bins of a kd-tree together with their split paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Original item indices of each leaf, in left-to-right leaf order.
    pub bins: Vec<Vec<usize>>,
    /// Root-to-leaf path of each bin over `{'l', 'g'}`.
    pub paths: Vec<String>,
    /// Target leaf size the tree was built with.
    pub leaf_size: usize,
}

/// Scales each column into `[0, 1]` independently; constant columns become zeros.
pub fn normalize(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    columns
        .iter()
        .map(|column| {
            let lo = column.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let span = hi - lo;
            if span > 0.0 {
                column.iter().map(|v| (v - lo) / span).collect()
            } else {
                vec![0.0; column.len()]
            }
        })
        .collect()
}

/// Normalizes `columns`, builds the kd-tree and flattens it.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if a column length differs from `len`.
pub fn partition(len: usize, columns: &[Vec<f64>], leaf_size: usize) -> Result<Partition> {
    let points = PointSet::new(len, normalize(columns)).ok_or_else(|| {
        Error::config(format!(
            "every selection attribute must have {len} values"
        ))
    })?;
    let tree = KdTree::build(&points, leaf_size);
    let partition = Partition::from_tree(&tree);
    let oversized = partition.oversized();
    if !oversized.is_empty() {
        warn!(
            "{} bin(s) exceed the target leaf size {} because of duplicated points: {:?}",
            oversized.len(),
            leaf_size,
            oversized
        );
    }
    Ok(partition)
}

/// Accumulates leaf sizes and paths during traversal.
#[derive(Debug, Default)]
struct LeafCollector {
    sizes: Vec<usize>,
    paths: Vec<String>,
}

impl LeafCollector {
    fn visit(&mut self, tree: &KdTree, node: usize, path: &mut String) {
        match tree.node(node) {
            Node::Leaf { start, end } => {
                self.sizes.push(end - start);
                self.paths.push(path.clone());
            }
            Node::Split { less, greater, .. } => {
                path.push('l');
                self.visit(tree, *less, path);
                path.pop();
                path.push('g');
                self.visit(tree, *greater, path);
                path.pop();
            }
        }
    }
}

impl Partition {
    /// Flattens a built tree into bins of original item indices.
    pub fn from_tree(tree: &KdTree) -> Self {
        let mut collector = LeafCollector::default();
        if let Some(root) = tree.root() {
            collector.visit(tree, root, &mut String::new());
        }

        let mut bins = Vec::with_capacity(collector.sizes.len());
        let mut offset = 0;
        for size in &collector.sizes {
            bins.push(tree.indices()[offset..offset + size].to_vec());
            offset += size;
        }

        Partition {
            bins,
            paths: collector.paths,
            leaf_size: tree.leaf_size(),
        }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Returns true if there are no bins.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bin sizes in order.
    pub fn sizes(&self) -> Vec<usize> {
        self.bins.iter().map(Vec::len).collect()
    }

    /// Indices of bins larger than the target leaf size.
    pub fn oversized(&self) -> Vec<usize> {
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, bin)| bin.len() > self.leaf_size)
            .map(|(i, _)| i)
            .collect()
    }

    /// Verify the disjoint-cover invariant over a population of `len` items.
    pub fn verify(&self, len: usize) -> bool {
        if self.paths.len() != self.bins.len() {
            return false;
        }
        let mut seen = vec![false; len];
        for &item in self.bins.iter().flatten() {
            match seen.get_mut(item) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Mean coordinates of every bin over the given columns.
    ///
    /// Returns one row per bin, one value per column; empty bins yield NaN.
    pub fn centroids(&self, columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
        self.bins
            .iter()
            .map(|bin| {
                columns
                    .iter()
                    .map(|column| {
                        let sum: f64 = bin.iter().map(|&i| column[i]).sum();
                        sum / bin.len() as f64
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_scales_each_column_independently() {
        let cols = normalize(&[vec![10.0, 20.0, 15.0], vec![-1.0, -1.0, -1.0]]);
        assert_eq!(cols[0], vec![0.0, 1.0, 0.5]);
        assert_eq!(cols[1], vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn leaf_size_at_least_population_gives_one_bin() -> Result<()> {
        let p = partition(4, &[vec![4.0, 3.0, 2.0, 1.0]], 4)?;
        assert_eq!(p.bins, vec![vec![0, 1, 2, 3]]);
        assert_eq!(p.paths, vec![String::new()]);
        Ok(())
    }

    #[test]
    fn paths_follow_less_then_greater() -> Result<()> {
        let p = partition(4, &[vec![0.0, 1.0, 2.0, 3.0]], 1)?;
        assert_eq!(p.paths, vec!["ll", "lg", "gl", "gg"]);
        assert_eq!(p.bins, vec![vec![0], vec![1], vec![2], vec![3]]);
        Ok(())
    }

    #[test]
    fn two_attributes_split_on_widest_normalized_axis() -> Result<()> {
        // raw scales differ by 1000x; after normalization both span [0, 1]
        let x = vec![0.0, 1.0, 0.0, 1.0];
        let y = vec![0.0, 0.0, 1000.0, 1000.0];
        let p = partition(4, &[x, y], 2)?;
        assert!(p.verify(4));
        assert_eq!(p.bins, vec![vec![0, 2], vec![1, 3]]);
        Ok(())
    }

    #[test]
    fn zero_attributes_form_a_single_oversized_bin() -> Result<()> {
        let p = partition(5, &[], 2)?;
        assert_eq!(p.bins, vec![vec![0, 1, 2, 3, 4]]);
        assert_eq!(p.oversized(), vec![0]);
        Ok(())
    }

    #[test]
    fn empty_population_has_no_bins() -> Result<()> {
        let p = partition(0, &[vec![]], 3)?;
        assert!(p.is_empty());
        assert!(p.verify(0));
        Ok(())
    }

    #[test]
    fn centroids_average_bin_members() -> Result<()> {
        let col = vec![0.0, 1.0, 2.0, 3.0];
        let p = partition(4, &[col.clone()], 2)?;
        assert_eq!(p.centroids(&[col]), vec![vec![0.5], vec![2.5]]);
        Ok(())
    }

    #[test]
    fn verify_rejects_overlap_and_gaps() {
        let p = Partition {
            bins: vec![vec![0, 1], vec![1]],
            paths: vec!["l".into(), "g".into()],
            leaf_size: 2,
        };
        assert!(!p.verify(3));
        let p = Partition {
            bins: vec![vec![0], vec![2]],
            paths: vec!["l".into(), "g".into()],
            leaf_size: 2,
        };
        assert!(!p.verify(3));
    }

    #[test]
    fn mismatched_column_is_configuration_error() {
        let err = partition(3, &[vec![1.0, 2.0]], 1);
        assert!(matches!(err, Err(Error::Configuration(_))));
    }
}
