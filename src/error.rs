//! Error types in treefit
//!

use thiserror::Error;

use ndarray::ShapeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    Parameters(String),
    #[error("missing required column `{0}` in input header")]
    MissingColumn(String),
    #[error("row {row}: could not parse `{value}` as a number")]
    InvalidValue { row: usize, value: String },
    #[error("dataset contains no rows")]
    EmptyDataset,
    #[error("class `{label}` has {count} sample(s), too few to appear in both partitions")]
    TooFewClassSamples { label: String, count: usize },
    #[error("predictions and ground truth differ in length ({0} vs {1})")]
    MismatchedLengths(usize, usize),
    #[error("unsupported model file version {found} (expected {expected})")]
    ModelVersion { found: u32, expected: u32 },
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("model file encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_render_as_messages() {
        // the binary reports failures through `Display`, not `Debug`
        let err = Error::InvalidValue {
            row: 2,
            value: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "row 2: could not parse `oops` as a number");

        let err = Error::MissingColumn("petal_width".to_string());
        assert_eq!(
            err.to_string(),
            "missing required column `petal_width` in input header"
        );

        let err = Error::ModelVersion {
            found: 2,
            expected: 1,
        };
        assert_eq!(err.to_string(), "unsupported model file version 2 (expected 1)");
    }
}
