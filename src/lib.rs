//! `treefit` trains a decision-tree classifier from a labeled tabular
//! dataset and persists it for later reuse.
//!
//! The pipeline is strictly linear: a CSV file is loaded into a
//! [`Dataset`], partitioned into training and evaluation subsets with a
//! seeded stratified split, a [`tree::DecisionTree`] is fitted on the
//! training rows, and the fitted model is scored on the held-out rows and
//! written to disk as a versioned binary artifact.
//!
//! Everything is deterministic: for a fixed input file, depth and seed, two
//! runs produce bit-identical model files.

pub mod dataset;
pub mod error;
pub mod metrics;
mod param_guard;
pub mod persist;
mod run;
pub mod traits;
pub mod tree;

pub use dataset::{Dataset, Float, Label};
pub use error::{Error, Result};
pub use param_guard::ParamGuard;
pub use run::{run, Config, SPLIT_SEED, TEST_FRACTION};
pub use traits::{Fit, Predict, PredictInplace};
