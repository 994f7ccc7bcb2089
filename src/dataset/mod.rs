//! Datasets
//!
//! This module implements the dataset struct holding an observation matrix and
//! the class label of every observation, together with the loading and
//! splitting operations of the training pipeline.
use std::fmt;
use std::hash::Hash;
use std::iter::Sum;

use ndarray::{Array1, Array2};
use num_traits::NumCast;

mod load;
mod split;

pub use load::{from_reader, load_csv, FEATURE_COLUMNS, LABEL_COLUMN};

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumptions on floating
/// point numbers and implements them for 32bit and 64bit floating points. They
/// are used for the records of a dataset and for the split thresholds of a
/// fitted tree.
pub trait Float:
    num_traits::Float
    + num_traits::FromPrimitive
    + fmt::Debug
    + fmt::Display
    + Default
    + Sum
    + Send
    + Sync
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}
impl Float for f64 {}

/// Discrete labels
///
/// Labels are countable, comparable and hashable. Boolean (binary tasks),
/// usize and string labels are supported.
pub trait Label: PartialEq + Eq + Hash + Clone + fmt::Debug {}

impl Label for bool {}
impl Label for usize {}
impl Label for String {}

/// Dataset
///
/// An ordered, immutable collection of observations. The records are stored as
/// a two-dimensional matrix with dimensionality (nsamples, nfeatures), row
/// aligned with a target vector of class labels. Feature names are always
/// owned and copied into derived datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<F: Float, L: Label> {
    records: Array2<F>,
    targets: Array1<L>,
    feature_names: Vec<String>,
}

impl<F: Float, L: Label> Dataset<F, L> {
    /// Create a new dataset from a record matrix and a target vector
    ///
    /// ### Panics
    ///
    /// If the number of records and targets differ
    pub fn new(records: Array2<F>, targets: Array1<L>) -> Self {
        assert_eq!(
            records.nrows(),
            targets.len(),
            "The number of records must match the number of targets."
        );

        let feature_names = (0..records.ncols()).map(|i| format!("feature-{}", i)).collect();

        Dataset {
            records,
            targets,
            feature_names,
        }
    }

    /// Updates the feature names of the dataset
    pub fn with_feature_names<S: Into<String>>(mut self, names: Vec<S>) -> Self {
        assert_eq!(
            names.len(),
            self.records.ncols(),
            "The number of feature names must match the number of features."
        );

        self.feature_names = names.into_iter().map(|x| x.into()).collect();
        self
    }

    /// Returns the number of observations
    pub fn nsamples(&self) -> usize {
        self.records.nrows()
    }

    /// Returns the number of features
    pub fn nfeatures(&self) -> usize {
        self.records.ncols()
    }

    pub fn records(&self) -> &Array2<F> {
        &self.records
    }

    pub fn targets(&self) -> &Array1<L> {
        &self.targets
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Returns the distinct labels in first-occurrence order
    ///
    /// The order is stable for a fixed dataset, which keeps everything derived
    /// from it (class tables, fitted trees, serialized models) reproducible
    /// between runs.
    pub fn labels(&self) -> Vec<L> {
        let mut labels = Vec::new();
        for label in self.targets.iter() {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }

        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn labels_in_first_occurrence_order() {
        let dataset = Dataset::new(
            array![[1.0], [2.0], [3.0], [4.0], [5.0]],
            array![
                "b".to_string(),
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "a".to_string()
            ],
        );

        assert_eq!(
            dataset.labels(),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn default_feature_names() {
        let dataset = Dataset::new(array![[1.0, 2.0], [3.0, 4.0]], array![0usize, 1]);
        assert_eq!(dataset.feature_names(), &["feature-0", "feature-1"]);

        let dataset = dataset.with_feature_names(vec!["width", "height"]);
        assert_eq!(dataset.feature_names(), &["width", "height"]);
    }

    #[test]
    #[should_panic]
    fn mismatched_targets_panic() {
        Dataset::new(array![[1.0], [2.0]], array![0usize]);
    }
}
