//! Decision tree learning
//!
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use serde::{Deserialize, Serialize};

use super::{DecisionTreeValidParams, NodeIter, SplitQuality};
use crate::dataset::{Dataset, Float, Label};
use crate::error::{Error, Result};
use crate::traits::{Fit, PredictInplace};

/// RowMask tracks observations
///
/// The decision tree algorithm splits observations at a certain split value
/// for a specific feature. The left and right children can then only use a
/// certain number of observations. In order to track that, the observations
/// are masked with a boolean vector, hiding all observations which are not
/// applicable in a lower subtree.
struct RowMask {
    mask: Vec<bool>,
    nsamples: usize,
}

impl RowMask {
    /// Generates a RowMask without hidden observations
    fn all(nsamples: usize) -> Self {
        RowMask {
            mask: vec![true; nsamples],
            nsamples,
        }
    }

    /// Generates a RowMask where all observations are hidden
    fn none(nsamples: usize) -> Self {
        RowMask {
            mask: vec![false; nsamples],
            nsamples: 0,
        }
    }

    /// Sets the observation at the specified index as visible
    ///
    /// ### Panics
    ///
    /// If `idx` is out of bounds
    fn mark(&mut self, idx: usize) {
        self.mask[idx] = true;
        self.nsamples += 1;
    }
}

/// Sorted values of observations with indices (always for a particular feature)
struct SortedIndex<F: Float> {
    sorted_values: Vec<(usize, F)>,
}

impl<F: Float> SortedIndex<F> {
    /// Sorts the values of a given feature in ascending order
    fn of_array_column(x: &Array2<F>, feature_idx: usize) -> Self {
        let sliced_column: Vec<F> = x.index_axis(Axis(1), feature_idx).to_vec();
        let mut pairs: Vec<(usize, F)> = sliced_column.into_iter().enumerate().collect();
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Greater));

        SortedIndex {
            sorted_values: pairs,
        }
    }
}

/// A node in the decision tree
///
/// Nodes live in the arena owned by [`DecisionTree`] and reference their
/// children through indices into that arena, which keeps the structure
/// cycle-free and directly serializable. Leaf nodes have no children; every
/// node carries the per-class sample counts of the observations routed to it
/// and predicts the modal class among them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode<F> {
    feature_idx: usize,
    split_value: F,
    impurity_decrease: F,
    left: Option<usize>,
    right: Option<usize>,
    class_counts: Vec<usize>,
    prediction: usize,
    depth: usize,
}

impl<F: Float> TreeNode<F> {
    fn leaf(class_counts: Vec<usize>, prediction: usize, depth: usize) -> Self {
        TreeNode {
            feature_idx: 0,
            split_value: F::zero(),
            impurity_decrease: F::zero(),
            left: None,
            right: None,
            class_counts,
            prediction,
            depth,
        }
    }

    /// Returns true if the node has no children
    pub fn is_leaf(&self) -> bool {
        self.left.is_none()
    }

    /// Returns the depth of the node in the decision tree
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Return the arena indices of both children, first left then right
    pub fn children(&self) -> (Option<usize>, Option<usize>) {
        (self.left, self.right)
    }

    /// Return the split (feature index, value) and its impurity decrease
    pub fn split(&self) -> (usize, F, F) {
        (self.feature_idx, self.split_value, self.impurity_decrease)
    }

    /// Return the per-class sample counts of the observations routed to this
    /// node, aligned with the class table of the owning tree
    pub fn class_counts(&self) -> &[usize] {
        &self.class_counts
    }

    /// Return the predicted class as an index into the class table of the
    /// owning tree
    pub fn prediction(&self) -> usize {
        self.prediction
    }
}

/// Bundles everything the recursive fitting step needs to look at
struct FitContext<'a, F: Float, L> {
    x: &'a Array2<F>,
    class_of: &'a [usize],
    nclasses: usize,
    params: &'a DecisionTreeValidParams<F, L>,
    sorted_indices: &'a [SortedIndex<F>],
}

impl<'a, F: Float, L> FitContext<'a, F, L> {
    /// Recursively fits a node and its subtree into the arena, returning the
    /// arena index of the fitted node
    fn fit_node(&self, mask: &RowMask, depth: usize, nodes: &mut Vec<TreeNode<F>>) -> usize {
        // per-class counts for the observations routed to this node
        let mut class_counts = vec![0usize; self.nclasses];
        for (row, &visible) in mask.mask.iter().enumerate() {
            if visible {
                class_counts[self.class_of[row]] += 1;
            }
        }
        // set our prediction for this subset to the modal class
        let prediction = find_modal_class(&class_counts);

        let idx = nodes.len();
        nodes.push(TreeNode::leaf(class_counts.clone(), prediction, depth));

        // stay a leaf when the node is pure, has too few samples to split or
        // the maximal depth is reached
        let pure = class_counts.iter().filter(|&&c| c > 0).count() <= 1;
        if pure
            || mask.nsamples < self.params.min_samples_split()
            || self
                .params
                .max_depth()
                .map(|max_depth| depth >= max_depth)
                .unwrap_or(false)
        {
            return idx;
        }

        // Find the best split for the current level
        let mut best = None;

        // Iterate over all features
        for (feature_idx, sorted_index) in self.sorted_indices.iter().enumerate() {
            let mut right_counts = class_counts.clone();
            let mut left_counts = vec![0usize; self.nclasses];

            let total = mask.nsamples;
            let mut n_right = total;
            let mut n_left = 0usize;

            // We start with all visible observations in the right subset and
            // move them (in the order sorted by this feature) one by one to
            // the left subset, scoring the quality of every resulting
            // partition. The score of each candidate is compared with `best`
            // in order to find the best possible split.
            for i in 0..sorted_index.sorted_values.len() - 1 {
                let (row, value) = sorted_index.sorted_values[i];

                // Skip if the observation is unavailable in this subtree
                if !mask.mask[row] {
                    continue;
                }

                let class = self.class_of[row];
                right_counts[class] -= 1;
                n_right -= 1;
                left_counts[class] += 1;
                n_left += 1;

                // Continue if the next value is equal, so that equal values
                // end up in the same subset
                if (value - sorted_index.sorted_values[i + 1].1).abs() < F::cast(1e-5) {
                    continue;
                }

                // If the split would result in too few samples in a leaf
                // then skip computing the quality
                if n_left < self.params.min_samples_leaf()
                    || n_right < self.params.min_samples_leaf()
                {
                    continue;
                }

                // Calculate the quality of each resulting subset
                let (left_score, right_score) = match self.params.split_quality() {
                    SplitQuality::Gini => (
                        gini_impurity(&left_counts, n_left),
                        gini_impurity(&right_counts, n_right),
                    ),
                    SplitQuality::Entropy => (
                        entropy(&left_counts, n_left),
                        entropy(&right_counts, n_right),
                    ),
                };

                // Weight the qualities based on the number of samples in each
                // subset
                let score =
                    (n_left as f64 * left_score + n_right as f64 * right_score) / total as f64;

                // Take the midpoint of this value and the next one as split
                // value
                let split_value = (value + sorted_index.sorted_values[i + 1].1) / F::cast(2.0);

                // Override the best candidate when the score improved; ties
                // keep the first candidate encountered, so fitting is fully
                // deterministic
                best = match best.take() {
                    None => Some((feature_idx, split_value, score)),
                    Some((_, _, best_score)) if score < best_score => {
                        Some((feature_idx, split_value, score))
                    }
                    x => x,
                };
            }
        }

        // At this point all candidate splits over all features have been
        // scored and the best one (if any) is stored in `best`. The impurity
        // decrease is the impurity of the unsplit node minus the impurity of
        // the partition; the split is only applied when the decrease clears
        // the configured threshold, otherwise the node stays a leaf that
        // predicts the modal class.
        let (best_feature_idx, best_split_value, best_score) = match best {
            Some(best) => best,
            None => return idx,
        };

        let parent_score = match self.params.split_quality() {
            SplitQuality::Gini => gini_impurity(&class_counts, mask.nsamples),
            SplitQuality::Entropy => entropy(&class_counts, mask.nsamples),
        };

        let impurity_decrease = F::cast(parent_score - best_score);
        if impurity_decrease < self.params.min_impurity_decrease() {
            return idx;
        }

        // determine the masks for the left and right subtrees
        let mut left_mask = RowMask::none(self.x.nrows());
        let mut right_mask = RowMask::none(self.x.nrows());

        for row in 0..self.x.nrows() {
            if mask.mask[row] {
                if self.x[(row, best_feature_idx)] <= best_split_value {
                    left_mask.mark(row);
                } else {
                    right_mask.mark(row);
                }
            }
        }

        let left = self.fit_node(&left_mask, depth + 1, nodes);
        let right = self.fit_node(&right_mask, depth + 1, nodes);

        let node = &mut nodes[idx];
        node.feature_idx = best_feature_idx;
        node.split_value = best_split_value;
        node.impurity_decrease = impurity_decrease;
        node.left = Some(left);
        node.right = Some(right);

        idx
    }
}

/// Prune the subtree rooted at `idx` after fitting it
///
/// This removes parts of the tree which result in the same prediction for all
/// sub-trees. Returns the shared prediction if the subtree collapsed into a
/// leaf.
fn prune<F: Float>(nodes: &mut [TreeNode<F>], idx: usize) -> Option<usize> {
    let (left, right) = (nodes[idx].left, nodes[idx].right);

    match (left, right) {
        (Some(l), Some(r)) => {
            let left = prune(nodes, l);
            let right = prune(nodes, r);

            match (left, right) {
                (Some(x), Some(y)) if x == y => {
                    nodes[idx].left = None;
                    nodes[idx].right = None;

                    Some(x)
                }
                _ => None,
            }
        }
        _ => Some(nodes[idx].prediction),
    }
}

/// Rebuild the arena in preorder, dropping nodes orphaned by pruning so the
/// serialized artifact only contains reachable nodes
fn compact<F: Float>(nodes: &[TreeNode<F>]) -> Vec<TreeNode<F>> {
    fn visit<F: Float>(nodes: &[TreeNode<F>], idx: usize, out: &mut Vec<TreeNode<F>>) -> usize {
        let new_idx = out.len();
        out.push(nodes[idx].clone());

        if let (Some(left), Some(right)) = (nodes[idx].left, nodes[idx].right) {
            let left = visit(nodes, left, out);
            let right = visit(nodes, right, out);

            out[new_idx].left = Some(left);
            out[new_idx].right = Some(right);
        }

        new_idx
    }

    let mut out = Vec::new();
    visit(nodes, 0, &mut out);
    out
}

/// A fitted decision tree model for classification.
///
/// ### Structure
///
/// A decision tree is a binary tree where every internal node specifies a
/// decision, represented by a choice of a feature and a split value such that
/// all observations for which `feature <= split_value` holds fall in the left
/// subtree, while the others fall in the right subtree. Leaf nodes predict
/// the most popular label among the training observations routed to them.
///
/// The nodes are stored in an arena (`Vec` with index references, root at
/// index 0) so the fitted tree owns plain data without pointer graphs and can
/// be serialized as-is.
///
/// ### Algorithm
///
/// Starting with a single root node, the tree is grown recursively: for every
/// node the best split value of each feature is scored with the configured
/// [split quality](SplitQuality), the best feature/threshold pair is applied
/// and the observations are routed to the two resulting children. A node
/// stays a leaf when it is pure, when the maximum depth is reached or when no
/// candidate split decreases the impurity enough.
///
/// ### Predictions
///
/// To predict the label of a sample, the tree is traversed from the root to a
/// leaf, choosing between left and right children according to the values of
/// the features of the sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree<F, L> {
    nodes: Vec<TreeNode<F>>,
    classes: Vec<L>,
    feature_names: Vec<String>,
    num_features: usize,
}

impl<F: Float, L: Label, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<L>>
    for DecisionTree<F, L>
where
    L: Default,
{
    /// Make predictions for each row of a matrix of features `x`.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<L>) {
        assert_eq!(
            x.ncols(),
            self.num_features,
            "The number of features must match the fitted tree."
        );
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = self.predict_row(&row).clone();
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<L> {
        Array1::default(x.nrows())
    }
}

impl<F: Float, L: Label> Fit<F, L> for DecisionTreeValidParams<F, L> {
    type Object = DecisionTree<F, L>;

    /// Fit a decision tree on the dataset using the checked hyperparameters.
    fn fit(&self, dataset: &Dataset<F, L>) -> Result<Self::Object> {
        if dataset.nsamples() == 0 {
            return Err(Error::EmptyDataset);
        }

        let x = dataset.records();

        // fix the class table in first-occurrence order and map every target
        // to its dense class index
        let classes = dataset.labels();
        let class_of = dataset
            .targets()
            .iter()
            .map(|label| classes.iter().position(|c| c == label).unwrap())
            .collect::<Vec<_>>();

        let sorted_indices = (0..x.ncols())
            .map(|feature_idx| SortedIndex::of_array_column(x, feature_idx))
            .collect::<Vec<_>>();

        let ctx = FitContext {
            x,
            class_of: &class_of,
            nclasses: classes.len(),
            params: self,
            sorted_indices: &sorted_indices,
        };

        let mut nodes = Vec::new();
        ctx.fit_node(&RowMask::all(x.nrows()), 0, &mut nodes);

        prune(&mut nodes, 0);
        let nodes = compact(&nodes);

        Ok(DecisionTree {
            nodes,
            classes,
            feature_names: dataset.feature_names().to_vec(),
            num_features: x.ncols(),
        })
    }
}

impl<F: Float, L: Label> DecisionTree<F, L> {
    /// Classify a single observation by routing it down the tree
    fn predict_row<D: Data<Elem = F>>(&self, row: &ArrayBase<D, Ix1>) -> &L {
        let mut node = &self.nodes[0];

        loop {
            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    node = if row[node.feature_idx] <= node.split_value {
                        &self.nodes[left]
                    } else {
                        &self.nodes[right]
                    };
                }
                _ => return &self.classes[node.prediction],
            }
        }
    }

    /// Create a node iterator starting at the root
    pub fn iter_nodes(&self) -> NodeIter<F> {
        NodeIter::new(&self.nodes)
    }

    /// Return the feature indices appearing in the splits of this tree,
    /// in ascending order
    pub fn features(&self) -> Vec<usize> {
        let mut fitted_features = self
            .iter_nodes()
            .filter(|node| !node.is_leaf())
            .map(|node| node.feature_idx)
            .collect::<Vec<_>>();

        fitted_features.sort_unstable();
        fitted_features.dedup();
        fitted_features
    }

    /// Return the mean impurity decrease for each feature
    pub fn mean_impurity_decrease(&self) -> Vec<F> {
        let mut impurity_decrease = vec![F::zero(); self.num_features];
        let mut num_nodes = vec![0; self.num_features];

        for node in self.iter_nodes().filter(|node| !node.is_leaf()) {
            impurity_decrease[node.feature_idx] =
                impurity_decrease[node.feature_idx] + node.impurity_decrease;
            num_nodes[node.feature_idx] += 1;
        }

        impurity_decrease
            .into_iter()
            .zip(num_nodes.into_iter())
            .map(|(val, n)| if n == 0 { F::zero() } else { val / F::cast(n) })
            .collect()
    }

    /// Return the feature importance, i.e. the relative impurity decrease,
    /// for each feature
    pub fn feature_importance(&self) -> Vec<F> {
        let mean_impurity_decrease = self.mean_impurity_decrease();
        let sum: F = mean_impurity_decrease.iter().cloned().sum();

        mean_impurity_decrease
            .into_iter()
            .map(|x| x / sum)
            .collect()
    }

    /// Return the class table of the tree; leaf distributions and node
    /// predictions index into it
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// Return the feature names recorded at fitting time
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the root node of the tree
    pub fn root_node(&self) -> &TreeNode<F> {
        &self.nodes[0]
    }

    /// Return the maximum depth reached by the fitted tree
    pub fn max_depth(&self) -> usize {
        self.iter_nodes()
            .fold(0, |max, node| usize::max(max, node.depth))
    }

    /// Return the number of leaves in this tree
    pub fn num_leaves(&self) -> usize {
        self.iter_nodes().filter(|node| node.is_leaf()).count()
    }
}

/// Finds the class with the highest count. If two classes have the same
/// count then the class with the lower index is returned, keeping the choice
/// deterministic.
fn find_modal_class(class_counts: &[usize]) -> usize {
    let mut modal = 0;
    for (class, &count) in class_counts.iter().enumerate() {
        if count > class_counts[modal] {
            modal = class;
        }
    }

    modal
}

/// Given the class counts of a subset, calculates its gini impurity.
fn gini_impurity(class_counts: &[usize], n_samples: usize) -> f64 {
    assert!(n_samples > 0);

    let purity = class_counts
        .iter()
        .map(|&c| c as f64 / n_samples as f64)
        .map(|x| x * x)
        .sum::<f64>();

    1.0 - purity
}

/// Given the class counts of a subset, calculates its entropy.
fn entropy(class_counts: &[usize], n_samples: usize) -> f64 {
    assert!(n_samples > 0);

    class_counts
        .iter()
        .map(|&c| c as f64 / n_samples as f64)
        .map(|x| if x > 0.0 { -x * x.log2() } else { 0.0 })
        .sum()
}
