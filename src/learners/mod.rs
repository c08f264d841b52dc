//! Regression tree base learner.
//!
//! The builder grows a binary decision tree by exhaustive split search:
//! every feature, every distinct observed value as a threshold, keeping
//! the split with the smallest summed within-side squared error. The
//! search is brute force on purpose — the ensemble relies on each split
//! being loss-optimal among all axis-aligned splits on the rows at that
//! node.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{GBoostError, Result};

/// Models that learn a mapping from an n×d feature matrix to an n-vector
/// of real-valued targets.
///
/// `fit` must be safely callable multiple times on the same instance, each
/// call fully replacing prior trained state; the resampling harnesses in
/// [`crate::model_selection`] depend on that.
pub trait Regressor {
    /// Trains the model, replacing any previously trained state.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predicts one value per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// A node of a fitted regression tree.
///
/// Internal nodes exclusively own their two children; the children
/// partition the node's rows with no overlap and no omission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// Terminal region. Predicts the mean target of the rows that built it.
    Leaf { value: f64 },
    /// Binary decision on one feature. Rows with `feature <= threshold`
    /// descend left, the rest descend right.
    Internal {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Depth of the subtree rooted at this node; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of leaves in the subtree rooted at this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// An immutable fitted tree: the root node plus the depth limit it was
/// built with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedTree {
    root: Node,
    max_depth: usize,
}

impl FittedTree {
    /// The root of the decision structure.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The depth limit the tree was built with.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Predicts one value per row by routing each row independently from
    /// the root to a leaf.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.outer_iter()
            .map(|row| {
                let mut node = &self.root;
                loop {
                    match node {
                        Node::Leaf { value } => break *value,
                        Node::Internal {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if row[*feature] <= *threshold { left } else { right };
                        }
                    }
                }
            })
            .collect()
    }

    /// Routes each row to a leaf and returns a stable identifier for the
    /// leaf it reached.
    ///
    /// Identifiers encode the root-to-leaf path (root is 1, a left child
    /// doubles it, a right child doubles and adds one), so two rows share
    /// an identifier exactly when they reach the same leaf.
    pub fn apply(&self, x: &Array2<f64>) -> Vec<usize> {
        x.outer_iter()
            .map(|row| {
                let mut node = &self.root;
                let mut id = 1usize;
                loop {
                    match node {
                        Node::Leaf { .. } => break id,
                        Node::Internal {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            if row[*feature] <= *threshold {
                                node = left;
                                id *= 2;
                            } else {
                                node = right;
                                id = 2 * id + 1;
                            }
                        }
                    }
                }
            })
            .collect()
    }
}

/// Greedy recursive binary-split regression tree learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    max_depth: usize,
    tree: Option<FittedTree>,
}

impl DecisionTreeRegressor {
    pub fn new(max_depth: usize) -> Self {
        DecisionTreeRegressor {
            max_depth,
            tree: None,
        }
    }

    /// The fitted tree, if `fit` has been called.
    pub fn tree(&self) -> Option<&FittedTree> {
        self.tree.as_ref()
    }

    /// Builds a tree for `(x, y)` without touching the stored state. The
    /// boosting loop uses this to grow one immutable tree per round.
    pub(crate) fn fit_tree(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedTree> {
        validate_input(x, y)?;
        Ok(FittedTree {
            root: build(x, y, 0, self.max_depth),
            max_depth: self.max_depth,
        })
    }
}

impl Regressor for DecisionTreeRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.tree = Some(self.fit_tree(x, y)?);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match &self.tree {
            Some(tree) => Ok(tree.predict(x)),
            None => Err(GBoostError::NotFitted),
        }
    }
}

/// Rejects mismatched or empty inputs before any computation starts.
pub(crate) fn validate_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(GBoostError::InvalidInput(
            "feature matrix is empty".to_string(),
        ));
    }
    if y.is_empty() {
        return Err(GBoostError::InvalidInput(
            "target vector is empty".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(GBoostError::InvalidInput(format!(
            "feature matrix has {} rows but target vector has {} entries",
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}

/// Mean of a non-empty vector.
pub(crate) fn mean(values: &Array1<f64>) -> f64 {
    values.sum() / values.len() as f64
}

fn is_constant(values: &Array1<f64>) -> bool {
    values.iter().all(|&v| v == values[0])
}

/// Sum of squared deviations from the mean of a non-empty slice.
fn sum_of_squared_error(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum()
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    loss: f64,
}

/// Exhaustive search over every (feature, threshold) pair.
///
/// Thresholds are the distinct observed values of each column, visited in
/// ascending order with features outermost; strict `<` on the tracked loss
/// keeps the first pair found on ties. Returns `None` when no threshold
/// leaves both sides non-empty (a degenerate region — the caller falls
/// back to a leaf).
fn find_best_split(x: &Array2<f64>, y: &Array1<f64>) -> Option<BestSplit> {
    let mut best: Option<BestSplit> = None;

    for feature in 0..x.ncols() {
        let column = x.column(feature);
        let mut thresholds = column.to_vec();
        thresholds.sort_by(|a, b| a.partial_cmp(b).unwrap());
        thresholds.dedup();

        for &threshold in &thresholds {
            let mut left = Vec::new();
            let mut right = Vec::new();
            for (i, &target) in y.iter().enumerate() {
                if column[i] <= threshold {
                    left.push(target);
                } else {
                    right.push(target);
                }
            }

            if left.is_empty() || right.is_empty() {
                continue;
            }

            let loss = sum_of_squared_error(&left) + sum_of_squared_error(&right);
            if best.as_ref().map_or(true, |b| loss < b.loss) {
                best = Some(BestSplit {
                    feature,
                    threshold,
                    loss,
                });
            }
        }
    }

    best
}

fn partition(x: &Array2<f64>, feature: usize, threshold: f64) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (i, &value) in x.column(feature).iter().enumerate() {
        if value <= threshold {
            left.push(i);
        } else {
            right.push(i);
        }
    }
    (left, right)
}

fn build(x: &Array2<f64>, y: &Array1<f64>, depth: usize, max_depth: usize) -> Node {
    if depth >= max_depth || is_constant(y) {
        return Node::Leaf { value: mean(y) };
    }

    let split = match find_best_split(x, y) {
        Some(split) => split,
        None => return Node::Leaf { value: mean(y) },
    };

    let (left_rows, right_rows) = partition(x, split.feature, split.threshold);
    let left = build(
        &x.select(Axis(0), &left_rows),
        &y.select(Axis(0), &left_rows),
        depth + 1,
        max_depth,
    );
    let right = build(
        &x.select(Axis(0), &right_rows),
        &y.select(Axis(0), &right_rows),
        depth + 1,
        max_depth,
    );

    Node::Internal {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sum_of_squared_error() {
        assert_relative_eq!(sum_of_squared_error(&[3.0, 3.0, 3.0]), 0.0, epsilon = 1e-12);
        // Mean 2, deviations -1 and 1.
        assert_relative_eq!(sum_of_squared_error(&[1.0, 3.0]), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_find_best_split_step_target() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = Array1::from_vec(vec![1.0, 1.0, 10.0, 10.0]);

        let split = find_best_split(&x, &y).unwrap();
        assert_eq!(split.feature, 0);
        assert_relative_eq!(split.threshold, 2.0, epsilon = 1e-12);
        assert_relative_eq!(split.loss, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_find_best_split_rejects_one_sided_cuts() {
        // Every row identical: no threshold leaves both sides non-empty.
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 5.0, 1.0, 5.0, 1.0, 5.0]).unwrap();
        let y = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(find_best_split(&x, &y).is_none());
    }

    #[test]
    fn test_partition_covers_all_rows() {
        let x = Array2::from_shape_vec((5, 1), vec![0.1, 0.9, 0.5, 0.3, 0.7]).unwrap();
        let (left, right) = partition(&x, 0, 0.5);
        assert_eq!(left, vec![0, 2, 3]);
        assert_eq!(right, vec![1, 4]);
    }

    #[test]
    fn test_constant_target_becomes_leaf() {
        let x =
            Array2::from_shape_vec((4, 2), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).unwrap();
        let y = Array1::from_vec(vec![7.5, 7.5, 7.5, 7.5]);

        let node = build(&x, &y, 0, 4);
        match node {
            Node::Leaf { value } => assert_relative_eq!(value, 7.5, epsilon = 1e-12),
            Node::Internal { .. } => panic!("pure region must not split"),
        }
    }

    #[test]
    fn test_apply_ids_match_leaves() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = Array1::from_vec(vec![1.0, 1.0, 10.0, 10.0]);

        let mut learner = DecisionTreeRegressor::new(1);
        learner.fit(&x, &y).unwrap();
        let tree = learner.tree().unwrap();

        let ids = tree.apply(&x);
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2], ids[3]);
        assert_ne!(ids[0], ids[2]);

        let predictions = tree.predict(&x);
        assert_relative_eq!(predictions[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(predictions[3], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let learner = DecisionTreeRegressor::new(2);
        let x = Array2::from_shape_vec((1, 1), vec![0.0]).unwrap();
        assert!(matches!(learner.predict(&x), Err(GBoostError::NotFitted)));
    }
}
