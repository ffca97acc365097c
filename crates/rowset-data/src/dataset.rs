// Dataset trait — unified interface for any data source

use rowset_core::Result;

/// A single sample: input features plus (possibly empty) target values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sample {
    /// Input feature vector.
    pub features: Vec<f64>,
    /// Target value(s). Empty when the dataset has no target columns.
    pub target: Vec<f64>,
}

/// A dataset is an indexed collection of samples.
///
/// Implementations must be `Send + Sync` so the DataLoader can fetch samples
/// from several threads when parallel fetching is enabled.
pub trait Dataset: Send + Sync {
    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample at position `index`.
    ///
    /// Returns [`rowset_core::Error::IndexOutOfBounds`] if `index >= self.len()`.
    fn get(&self, index: usize) -> Result<Sample>;

    /// Width of a sample's feature vector.
    fn num_features(&self) -> usize;

    /// Width of a sample's target vector.
    fn num_targets(&self) -> usize;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

/// Bounds check shared by dataset implementations.
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(rowset_core::Error::IndexOutOfBounds { index, len });
    }
    Ok(())
}
