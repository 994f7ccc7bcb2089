//! Common metrics for performance evaluation of a classifier
//!
//! Contains only the routine for the confusion matrix, as all other metrics
//! used here can be derived from the entries in the matrix.
use std::fmt;

use ndarray::prelude::*;
use ndarray::Data;

use crate::dataset::Label;
use crate::error::{Error, Result};

/// Confusion matrix for multi-class evaluation
///
/// A confusion matrix shows predictions in a matrix, where rows correspond to
/// targets and columns to predicted. The diagonal entries are correct
/// predictions.
pub struct ConfusionMatrix<L> {
    matrix: Array2<usize>,
    members: Vec<L>,
}

impl<L> ConfusionMatrix<L> {
    /// Return the fraction of correct predictions
    pub fn accuracy(&self) -> f32 {
        self.matrix.diag().sum() as f32 / self.matrix.sum() as f32
    }

    /// Calculate the precision for every class
    ///
    /// A class that was never predicted has precision zero.
    pub fn precision(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(0));

        Array1::from_iter(
            self.matrix
                .diag()
                .iter()
                .zip(sum.iter())
                .map(|(a, b)| if *b == 0 { 0.0 } else { *a as f32 / *b as f32 }),
        )
    }

    /// Calculate the recall for every class
    ///
    /// A class that only occurs in the predictions has recall zero.
    pub fn recall(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(1));

        Array1::from_iter(
            self.matrix
                .diag()
                .iter()
                .zip(sum.iter())
                .map(|(a, b)| if *b == 0 { 0.0 } else { *a as f32 / *b as f32 }),
        )
    }

    /// Return the classes covered by the matrix, in first-occurrence order
    pub fn members(&self) -> &[L] {
        &self.members
    }
}

/// Print a confusion matrix
impl<L: fmt::Debug> fmt::Debug for ConfusionMatrix<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "classes: {:?}", self.members)?;
        for row in self.matrix.rows() {
            writeln!(f, "{:?}", row)?;
        }

        Ok(())
    }
}

/// Compare a prediction against the ground truth
pub trait ToConfusionMatrix<L, T> {
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<L>>;
}

impl<L: Label, C: Data<Elem = L>, D: Data<Elem = L>> ToConfusionMatrix<L, &ArrayBase<D, Ix1>>
    for ArrayBase<C, Ix1>
{
    fn confusion_matrix(&self, ground_truth: &ArrayBase<D, Ix1>) -> Result<ConfusionMatrix<L>> {
        if self.len() != ground_truth.len() {
            return Err(Error::MismatchedLengths(self.len(), ground_truth.len()));
        }
        if self.is_empty() {
            return Err(Error::EmptyDataset);
        }

        // build the class list from ground truth first so its classes keep
        // their position even when never predicted
        let mut members: Vec<L> = Vec::new();
        for label in ground_truth.iter().chain(self.iter()) {
            if !members.contains(label) {
                members.push(label.clone());
            }
        }

        let mut matrix = Array2::zeros((members.len(), members.len()));
        for (truth, pred) in ground_truth.iter().zip(self.iter()) {
            let i = members.iter().position(|m| m == truth).unwrap();
            let j = members.iter().position(|m| m == pred).unwrap();
            matrix[(i, j)] += 1;
        }

        Ok(ConfusionMatrix { matrix, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn accuracy_counts_exact_matches() {
        let prediction = array![0usize, 1, 1, 2, 2];
        let truth = array![0usize, 1, 2, 2, 0];

        let cm = prediction.confusion_matrix(&truth).unwrap();
        assert_abs_diff_eq!(cm.accuracy(), 0.6, epsilon = 1e-6);
    }

    #[test]
    fn perfect_prediction_has_accuracy_one() {
        let prediction = array!["a".to_string(), "b".to_string(), "a".to_string()];
        let truth = prediction.clone();

        let cm = prediction.confusion_matrix(&truth).unwrap();
        assert_abs_diff_eq!(cm.accuracy(), 1.0, epsilon = 1e-6);
        assert_eq!(cm.members().len(), 2);
    }

    #[test]
    fn precision_and_recall_per_class() {
        // class 0: predicted twice, once correctly; two true members
        let prediction = array![0usize, 0, 1, 1];
        let truth = array![0usize, 1, 1, 0];

        let cm = prediction.confusion_matrix(&truth).unwrap();
        assert_abs_diff_eq!(cm.precision(), array![0.5f32, 0.5], epsilon = 1e-6);
        assert_abs_diff_eq!(cm.recall(), array![0.5f32, 0.5], epsilon = 1e-6);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let prediction = array![0usize, 1];
        let truth = array![0usize];

        let res = prediction.confusion_matrix(&truth);
        assert!(matches!(res, Err(Error::MismatchedLengths(2, 1))));
    }

    #[test]
    fn classes_only_in_ground_truth_are_counted() {
        let prediction = array![0usize, 0, 0];
        let truth = array![0usize, 1, 2];

        let cm = prediction.confusion_matrix(&truth).unwrap();
        assert_eq!(cm.members().len(), 3);
        assert_abs_diff_eq!(cm.accuracy(), 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn unpredicted_class_has_zero_precision_and_recall() {
        // class 2 occurs only in the ground truth, class 1 only in the
        // predictions; neither division may produce a NaN
        let prediction = array![0usize, 1, 0];
        let truth = array![0usize, 0, 2];

        let cm = prediction.confusion_matrix(&truth).unwrap();
        let precision = cm.precision();
        let recall = cm.recall();

        assert!(precision.iter().all(|p| p.is_finite()));
        assert!(recall.iter().all(|r| r.is_finite()));

        // members in first-occurrence order: [0, 2, 1]
        assert_abs_diff_eq!(precision[1], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(recall[2], 0.0, epsilon = 1e-6);
    }
}
