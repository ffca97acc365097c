//! # rowset
//!
//! Wrap an on-disk array of samples in a dataset, split it into
//! train/validation/test partitions, and iterate over it in batches.
//!
//! This is the top-level facade crate that re-exports everything you need.
//!
//! | Crate | Purpose |
//! |-------|----------|
//! | `rowset-core` | SampleTable, DType, `.npy` reading/writing, Error |
//! | `rowset-data` | Dataset, TableDataset, splitting, DataLoader, transforms |
//!
//! ```ignore
//! use rowset::prelude::*;
//!
//! let ds = TableDataset::from_npy("data.npy")?.with_target_cols(&[10])?;
//! let parts = ds.split(&SplitConfig::default().ratios(&[0.7, 0.15, 0.15]).seed(42))?;
//! let mut loader = DataLoader::new(&parts[0], DataLoaderConfig::default().batch_size(64))?;
//! for batch in loader.iter_batches() {
//!     let batch = batch?;
//!     // batch.features: [64, 10], batch.targets: [64, 1]
//! }
//! ```

/// Re-export core types.
pub use rowset_core::{npy, ColumnStats, DType, Error, NpyHeader, Result, SampleTable};

/// Re-export datasets, splitting and loading.
pub mod data {
    pub use rowset_data::*;
}

/// Run configuration loaded from TOML or JSON.
pub mod config;

/// Load, split, persist and iterate in one call.
pub mod pipeline;

pub use config::RunConfig;
pub use pipeline::{run, PartitionSummary, RunSummary};

/// Common imports.
pub mod prelude {
    pub use rowset_core::{npy, DType, Error, Result, SampleTable};
    pub use rowset_data::{
        Batch, Dataset, DataLoader, DataLoaderConfig, Partitions, Sample, SplitConfig,
        TableDataset,
    };
}
