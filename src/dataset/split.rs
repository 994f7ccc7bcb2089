//! Stratified train/test splitting
use ndarray::Axis;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{Dataset, Float, Label};
use crate::error::{Error, Result};

impl<F: Float, L: Label> Dataset<F, L> {
    /// Partition the dataset into `(train, test)` subsets with a seeded
    /// stratified sample
    ///
    /// For every class the requested fraction of its rows (rounded, but at
    /// least one row and at most all but one) is held out for the test
    /// subset. Row indices are shuffled per class with a [`SmallRng`] seeded
    /// from `seed`, so the partition is deterministic for a fixed dataset,
    /// fraction and seed. Both subsets preserve the row order of the original
    /// dataset.
    ///
    /// Fails if `test_fraction` lies outside `(0, 1)` or if any class has
    /// fewer than two members and therefore cannot appear in both subsets.
    pub fn split_stratified(&self, test_fraction: f64, seed: u64) -> Result<(Self, Self)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(Error::Parameters(format!(
                "test fraction must lie in (0, 1), but was {}",
                test_fraction
            )));
        }
        if self.nsamples() == 0 {
            return Err(Error::EmptyDataset);
        }

        // group row indices by class, keeping first-occurrence class order
        let classes = self.labels();
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); classes.len()];
        for (row, label) in self.targets().iter().enumerate() {
            let class = classes.iter().position(|c| c == label).unwrap();
            groups[class].push(row);
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut train_rows = Vec::new();
        let mut test_rows = Vec::new();

        for (class, mut rows) in groups.into_iter().enumerate() {
            let count = rows.len();
            if count < 2 {
                return Err(Error::TooFewClassSamples {
                    label: format!("{:?}", classes[class]),
                    count,
                });
            }

            let n_test = ((count as f64 * test_fraction).round() as usize)
                .max(1)
                .min(count - 1);

            rows.shuffle(&mut rng);
            test_rows.extend_from_slice(&rows[..n_test]);
            train_rows.extend_from_slice(&rows[n_test..]);
        }

        // restore the original row order within each subset
        train_rows.sort_unstable();
        test_rows.sort_unstable();

        Ok((self.subset(&train_rows), self.subset(&test_rows)))
    }

    fn subset(&self, rows: &[usize]) -> Self {
        Dataset::new(
            self.records().select(Axis(0), rows),
            self.targets().select(Axis(0), rows),
        )
        .with_feature_names(self.feature_names().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    /// 15 rows over three classes (6/5/4), each row carrying its index as the
    /// single feature value so partitions can be checked row by row.
    fn three_class_dataset() -> Dataset<f64, usize> {
        let records =
            Array2::from_shape_vec((15, 1), (0..15).map(|i| i as f64).collect()).unwrap();
        let targets = Array1::from(vec![0usize, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 2, 2, 2, 2]);

        Dataset::new(records, targets)
    }

    fn class_count(dataset: &Dataset<f64, usize>, class: usize) -> usize {
        dataset.targets().iter().filter(|t| **t == class).count()
    }

    #[test]
    fn partitions_are_exhaustive_and_disjoint() {
        let dataset = three_class_dataset();
        let (train, test) = dataset.split_stratified(0.4, 42).unwrap();

        assert_eq!(train.nsamples() + test.nsamples(), dataset.nsamples());

        let mut rows: Vec<usize> = train
            .records()
            .column(0)
            .iter()
            .chain(test.records().column(0).iter())
            .map(|v| *v as usize)
            .collect();
        rows.sort_unstable();

        assert_eq!(rows, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn per_class_proportions_are_preserved() {
        let dataset = three_class_dataset();
        let (train, test) = dataset.split_stratified(0.4, 42).unwrap();

        // round(6 * 0.4) = 2, round(5 * 0.4) = 2, round(4 * 0.4) = 2
        assert_eq!(class_count(&test, 0), 2);
        assert_eq!(class_count(&test, 1), 2);
        assert_eq!(class_count(&test, 2), 2);
        assert_eq!(class_count(&train, 0), 4);
        assert_eq!(class_count(&train, 1), 3);
        assert_eq!(class_count(&train, 2), 2);
    }

    #[test]
    fn subsets_preserve_row_order() {
        let dataset = three_class_dataset();
        let (train, test) = dataset.split_stratified(0.4, 42).unwrap();

        for subset in [&train, &test] {
            let rows: Vec<f64> = subset.records().column(0).to_vec();
            let mut sorted = rows.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(rows, sorted);
        }
    }

    #[test]
    fn same_seed_same_partition() {
        let dataset = three_class_dataset();
        let (train_a, test_a) = dataset.split_stratified(0.4, 42).unwrap();
        let (train_b, test_b) = dataset.split_stratified(0.4, 42).unwrap();

        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn singleton_class_is_rejected() {
        let records = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let targets = Array1::from(vec![0usize, 0, 1]);
        let dataset = Dataset::new(records, targets);

        let err = dataset.split_stratified(0.4, 42).unwrap_err();
        assert!(matches!(err, Error::TooFewClassSamples { count: 1, .. }));
    }

    #[test]
    fn invalid_fraction_is_rejected() {
        let dataset = three_class_dataset();

        assert!(matches!(
            dataset.split_stratified(0.0, 42),
            Err(Error::Parameters(_))
        ));
        assert!(matches!(
            dataset.split_stratified(1.0, 42),
            Err(Error::Parameters(_))
        ));
    }

    #[test]
    fn every_class_reaches_both_partitions() {
        // a fraction that would round to zero test rows for small classes
        let records = Array2::from_shape_vec((6, 1), (0..6).map(|i| i as f64).collect()).unwrap();
        let targets = Array1::from(vec![0usize, 0, 0, 0, 1, 1]);
        let dataset = Dataset::new(records, targets);

        let (train, test) = dataset.split_stratified(0.1, 7).unwrap();
        assert_eq!(class_count(&test, 1), 1);
        assert_eq!(class_count(&train, 1), 1);
    }
}
