//! The training pipeline
//!
//! Sequences the four stages of a run: load the CSV dataset, hold out a
//! stratified test partition, fit a decision tree on the remainder, then
//! report accuracy on the held-out rows and persist the fitted model.
use std::path::PathBuf;

use crate::dataset::load_csv;
use crate::error::Result;
use crate::metrics::ToConfusionMatrix;
use crate::param_guard::ParamGuard;
use crate::persist;
use crate::traits::{Fit, Predict};
use crate::tree::DecisionTree;

/// Fraction of rows held out per class for evaluation
pub const TEST_FRACTION: f64 = 0.4;

/// Seed for the stratified split, fixed so reruns are reproducible
pub const SPLIT_SEED: u64 = 42;

/// Immutable run configuration, constructed once at the process boundary
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the input CSV
    pub data: PathBuf,
    /// Path the serialized model is written to
    pub model: PathBuf,
    /// Maximum depth of the fitted tree
    pub depth: usize,
}

/// Execute one training run and return the test accuracy
///
/// Prints the two status lines of the success path; every failure propagates
/// to the caller unchanged. The accuracy line is printed before the model is
/// saved, so an unwritable model path still reports the evaluation.
pub fn run(config: &Config) -> Result<f32> {
    let dataset = load_csv(&config.data)?;
    let (train, test) = dataset.split_stratified(TEST_FRACTION, SPLIT_SEED)?;

    let params = DecisionTree::<f64, String>::params()
        .max_depth(Some(config.depth))
        .check()?;
    let model = params.fit(&train)?;

    let prediction = model.predict(test.records());
    let accuracy = prediction.confusion_matrix(test.targets())?.accuracy();
    println!("Model training complete. Accuracy: {:.4}", accuracy);

    persist::save(&config.model, &params, &model)?;
    println!("Model saved to {}", config.model.display());

    Ok(accuracy)
}
