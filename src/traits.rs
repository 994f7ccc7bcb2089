//! Traits at the model seam: parameter sets implement [`Fit`], fitted models
//! implement [`PredictInplace`] and get [`Predict`] for free.

use crate::dataset::{Dataset, Float, Label};
use crate::error::Result;

/// Fit a model from a dataset of records and targets
pub trait Fit<F: Float, L: Label> {
    type Object;

    fn fit(&self, dataset: &Dataset<F, L>) -> Result<Self::Object>;
}

/// Predict into an existing target container
pub trait PredictInplace<R, T> {
    /// Predict something in place
    fn predict_inplace(&self, records: &R, targets: &mut T);

    /// Create a container for the predictions of `records`
    fn default_target(&self, records: &R) -> T;
}

/// Predict with the fitted model, allocating the target container
pub trait Predict<R, T> {
    fn predict(&self, records: R) -> T;
}

impl<'a, R, T, S: PredictInplace<R, T>> Predict<&'a R, T> for S {
    fn predict(&self, records: &'a R) -> T {
        let mut targets = self.default_target(records);
        self.predict_inplace(records, &mut targets);
        targets
    }
}
