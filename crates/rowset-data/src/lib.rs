//! # rowset-data
//!
//! Datasets, splitting, and batching for rowset.
//!
//! This crate provides:
//! - [`Dataset`] trait — unified interface for any indexed data source
//! - [`TableDataset`] — a view over a shared [`rowset_core::SampleTable`]
//!   with an optional subset mapping
//! - [`DataLoader`] — batching, shuffling, parallel iteration over a Dataset
//   - Dataset combinators — SubsetDataset, ConcatDataset, MapDataset
//   - Train/validation/test splitting with reproducible seeding
//   - Per-sample transforms
//   - CSV import and synthetic tables

pub mod combinators;
pub mod csv_dataset;
pub mod dataset;
pub mod loader;
pub mod split;
pub mod synthetic;
pub mod table_dataset;
pub mod transform;

pub use combinators::{ConcatDataset, MapDataset, SubsetDataset};
pub use csv_dataset::CsvConfig;
pub use dataset::{Dataset, Sample};
pub use loader::{Batch, BatchIterator, DataLoader, DataLoaderConfig};
pub use split::{split_indices, train_test_split, Partitions, SplitConfig};
pub use synthetic::SyntheticConfig;
pub use table_dataset::TableDataset;
pub use transform::Transform;
