//! Decision tree learning
//!
//! Pure Rust implementation of single-tree fitting for classification:
//! hyperparameters with validity checking, the recursive CART fitting
//! algorithm over an arena of nodes, and prediction by tree traversal.

mod algorithm;
mod hyperparams;
mod iter;

pub use algorithm::*;
pub use hyperparams::*;
pub use iter::*;
