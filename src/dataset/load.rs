//! CSV loading
//!
//! Reads a delimited tabular file with a header row into a [`Dataset`]. The
//! required columns are located by name, so additional columns and arbitrary
//! column order are tolerated.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use ndarray::{Array1, Array2};

use super::Dataset;
use crate::error::{Error, Result};

/// The numeric feature columns expected in the input header
pub const FEATURE_COLUMNS: [&str; 4] = [
    "sepal_length",
    "sepal_width",
    "petal_length",
    "petal_width",
];

/// The categorical label column expected in the input header
pub const LABEL_COLUMN: &str = "species";

/// Read a dataset from a CSV file on disk
///
/// Fails with an IO error if the path cannot be opened; format errors are
/// reported by [`from_reader`].
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset<f64, String>> {
    from_reader(File::open(path)?)
}

/// Read a dataset from any CSV source with a header row
///
/// All required columns must be present in the header, otherwise the reader
/// fails fast with [`Error::MissingColumn`] instead of an opaque index error.
/// Unparseable numeric fields are reported with their row number.
pub fn from_reader<R: Read>(reader: R) -> Result<Dataset<f64, String>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    let feature_cols = FEATURE_COLUMNS
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == *name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        })
        .collect::<Result<Vec<usize>>>()?;
    let label_col = headers
        .iter()
        .position(|h| h == LABEL_COLUMN)
        .ok_or_else(|| Error::MissingColumn(LABEL_COLUMN.to_string()))?;

    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;

        for &col in &feature_cols {
            let field = record.get(col).unwrap_or("");
            let value = field.trim().parse::<f64>().map_err(|_| Error::InvalidValue {
                row: row + 1,
                value: field.to_string(),
            })?;
            features.push(value);
        }

        labels.push(record.get(label_col).unwrap_or("").to_string());
    }

    if labels.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let records = Array2::from_shape_vec((labels.len(), FEATURE_COLUMNS.len()), features)?;

    Ok(Dataset::new(records, Array1::from(labels))
        .with_feature_names(FEATURE_COLUMNS.to_vec()))
}
