//! Sliding-midpoint kd-tree over column-major points.
//!
//! Nodes live in a flat arena. Leaves own a contiguous range of the item
//! permutation, laid out in depth-first less-before-greater order, so the
//! permutation read left to right visits leaves in traversal order.

/// Column-major point set: `columns[d][i]` is coordinate `d` of item `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    len: usize,
    columns: Vec<Vec<f64>>,
}

impl PointSet {
    /// Builds a point set of `len` items from coordinate columns.
    ///
    /// Returns `None` when a column length differs from `len`.
    pub fn new(len: usize, columns: Vec<Vec<f64>>) -> Option<Self> {
        if columns.iter().any(|c| c.len() != len) {
            return None;
        }
        Some(Self { len, columns })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the set holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of coordinates per item.
    pub fn dimension(&self) -> usize {
        self.columns.len()
    }

    /// Coordinate `dim` of item `item`.
    #[inline]
    pub fn coord(&self, item: usize, dim: usize) -> f64 {
        self.columns[dim][item]
    }
}

/// Arena node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Interior node splitting on `dim` at `value`.
    Split {
        /// Split dimension.
        dim: usize,
        /// Items with coordinate `<= value` went left, except after a slide to the maximum.
        value: f64,
        /// Arena index of the "less" child.
        less: usize,
        /// Arena index of the "greater" child.
        greater: usize,
    },
    /// Leaf owning `indices[start..end]`.
    Leaf {
        /// First permutation slot.
        start: usize,
        /// One past the last permutation slot.
        end: usize,
    },
}

/// A kd-tree built with a target leaf size.
#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<Node>,
    indices: Vec<usize>,
    leaf_size: usize,
}

impl KdTree {
    /// Builds the tree. A node holding at most `leaf_size` items, or whose
    /// items share every coordinate, becomes a leaf.
    pub fn build(points: &PointSet, leaf_size: usize) -> Self {
        let mut tree = KdTree {
            nodes: Vec::new(),
            indices: (0..points.len()).collect(),
            leaf_size,
        };
        if !points.is_empty() {
            tree.build_node(points, 0, points.len());
        }
        tree
    }

    fn build_node(&mut self, points: &PointSet, start: usize, end: usize) -> usize {
        let count = end - start;
        if count <= self.leaf_size {
            return self.push(Node::Leaf { start, end });
        }

        let Some((dim, lo, hi)) = self.widest_dimension(points, start, end) else {
            // every coordinate identical: cannot split
            return self.push(Node::Leaf { start, end });
        };

        let mut value = (lo + hi) / 2.0;
        let mut mid = self.partition_slots(points, start, end, dim, |x| x <= value);
        if mid == start {
            value = lo;
            mid = self.partition_slots(points, start, end, dim, |x| x <= value);
        }
        if mid == end {
            value = hi;
            mid = self.partition_slots(points, start, end, dim, |x| x < value);
        }

        let node = self.push(Node::Leaf { start: 0, end: 0 });
        let less = self.build_node(points, start, mid);
        let greater = self.build_node(points, mid, end);
        self.nodes[node] = Node::Split {
            dim,
            value,
            less,
            greater,
        };
        node
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Dimension with maximum spread over `indices[start..end]`, with its
    /// bounds. `None` when the spread is zero everywhere.
    fn widest_dimension(
        &self,
        points: &PointSet,
        start: usize,
        end: usize,
    ) -> Option<(usize, f64, f64)> {
        let mut best: Option<(usize, f64, f64)> = None;
        let mut best_spread = 0.0;
        for dim in 0..points.dimension() {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for &item in &self.indices[start..end] {
                let v = points.coord(item, dim);
                lo = lo.min(v);
                hi = hi.max(v);
            }
            let spread = hi - lo;
            if spread > best_spread {
                best_spread = spread;
                best = Some((dim, lo, hi));
            }
        }
        best
    }

    /// Stable partition of `indices[start..end]` by `goes_left`; returns the
    /// first slot of the right-hand side.
    fn partition_slots(
        &mut self,
        points: &PointSet,
        start: usize,
        end: usize,
        dim: usize,
        goes_left: impl Fn(f64) -> bool,
    ) -> usize {
        let (left, right): (Vec<usize>, Vec<usize>) = self.indices[start..end]
            .iter()
            .copied()
            .partition(|&item| goes_left(points.coord(item, dim)));
        let mid = start + left.len();
        self.indices[start..mid].copy_from_slice(&left);
        self.indices[mid..end].copy_from_slice(&right);
        mid
    }

    /// Arena index of the root, `None` for an empty tree.
    pub fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Node at arena index `idx`.
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Item permutation: leaves own contiguous ranges of original item indices.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Target leaf size the tree was built with.
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: &[f64]) -> PointSet {
        PointSet::new(values.len(), vec![values.to_vec()]).unwrap_or_else(|| unreachable!())
    }

    #[test]
    fn small_input_is_single_leaf() {
        let tree = KdTree::build(&line(&[0.0, 1.0, 0.5]), 3);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.node(0), &Node::Leaf { start: 0, end: 3 });
    }

    #[test]
    fn midpoint_split_keeps_relative_order() {
        let tree = KdTree::build(&line(&[0.9, 0.1, 0.6, 0.2]), 2);
        assert_eq!(tree.indices(), &[1, 3, 0, 2]);
        assert!(matches!(
            tree.node(0),
            Node::Split { dim: 0, value, .. } if (value - 0.5).abs() < 1e-12
        ));
    }

    #[test]
    fn lone_outlier_splits_off_and_tied_cluster_stays_whole() {
        let tree = KdTree::build(&line(&[1.0, 1.0, 1.0, 0.0]), 1);
        assert_eq!(tree.indices(), &[3, 0, 1, 2]);
        assert_eq!(tree.node(1), &Node::Leaf { start: 0, end: 1 });
        assert_eq!(tree.node(2), &Node::Leaf { start: 1, end: 4 });
    }

    #[test]
    fn duplicates_form_oversized_leaf() {
        let tree = KdTree::build(&line(&[0.4; 5]), 2);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.node(0), &Node::Leaf { start: 0, end: 5 });
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        assert!(PointSet::new(3, vec![vec![0.0, 1.0]]).is_none());
    }
}
