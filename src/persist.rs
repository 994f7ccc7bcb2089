//! Model persistence
//!
//! A fitted tree is written to disk as a single binary artifact: a
//! [`ModelFile`] encoded with bincode, carrying a format version, the
//! hyperparameters the tree was fitted with and the complete tree state
//! (arena, thresholds, leaf distributions, class table). The format is
//! private to this crate; the version field guards against reading artifacts
//! written by an incompatible build.
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dataset::{Float, Label};
use crate::error::{Error, Result};
use crate::tree::{DecisionTree, DecisionTreeValidParams};

/// Version of the on-disk model schema
pub const FORMAT_VERSION: u32 = 1;

/// The complete serialized state of a fitted model
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelFile<F, L> {
    pub(crate) version: u32,
    pub params: DecisionTreeValidParams<F, L>,
    pub tree: DecisionTree<F, L>,
}

/// Serialize a fitted tree and its hyperparameters to `path`, overwriting any
/// existing file
pub fn save<F, L, P>(path: P, params: &DecisionTreeValidParams<F, L>, tree: &DecisionTree<F, L>) -> Result<()>
where
    F: Float + Serialize,
    L: Label + Serialize,
    P: AsRef<Path>,
{
    let file = ModelFile {
        version: FORMAT_VERSION,
        params: params.clone(),
        tree: tree.clone(),
    };

    fs::write(path, bincode::serialize(&file)?)?;
    Ok(())
}

/// Read a model artifact back from `path`
///
/// Fails if the file cannot be read, decoded, or was written with a different
/// [`FORMAT_VERSION`].
pub fn load<F, L, P>(path: P) -> Result<ModelFile<F, L>>
where
    F: Float + DeserializeOwned,
    L: Label + DeserializeOwned,
    P: AsRef<Path>,
{
    let buf = fs::read(path)?;
    let file: ModelFile<F, L> = bincode::deserialize(&buf)?;

    if file.version != FORMAT_VERSION {
        return Err(Error::ModelVersion {
            found: file.version,
            expected: FORMAT_VERSION,
        });
    }

    Ok(file)
}
