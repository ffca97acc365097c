// Pipeline — load, split, persist and iterate one sample table
//
//   input.npy -> TableDataset -> split -> [train.npy, val.npy, test.npy]
//                                      -> one DataLoader epoch per partition

use std::fs;

use rowset_core::{DType, Result};
use rowset_data::{DataLoader, Dataset, Partitions, TableDataset};

use crate::config::RunConfig;

/// What one pass over a partition produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub name: &'static str,
    pub samples: usize,
    pub batches: usize,
}

/// Result of [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub num_features: usize,
    pub num_targets: usize,
    pub partitions: Vec<PartitionSummary>,
}

/// Split the table named by `config.input` and iterate every partition once.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    config.validate()?;

    let dataset = TableDataset::from_npy(&config.input)?.with_target_cols(&config.target_cols)?;
    log::info!(
        "loaded {} samples ({} features, {} targets) from {}",
        dataset.len(),
        dataset.num_features(),
        dataset.num_targets(),
        config.input.display()
    );

    let parts = Partitions::from_splits(dataset.split(&config.split)?)?;

    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir)?;
        for (name, part) in parts.named() {
            let path = dir.join(format!("{name}.npy"));
            part.save_npy(&path, DType::F64)?;
            log::info!("wrote {} samples to {}", part.len(), path.display());
        }
    }

    let mut partitions = Vec::new();
    for (name, part) in parts.named() {
        let mut loader = DataLoader::new(part, config.loader.clone())?;
        let mut batches = 0;
        let mut samples = 0;
        for batch in loader.iter_batches() {
            let batch = batch?;
            log::debug!(
                "{name} batch {batches}: features {:?}, targets {:?}",
                batch.features.shape(),
                batch.targets.shape()
            );
            samples += batch.len();
            batches += 1;
        }
        log::info!("{name}: {samples} samples in {batches} batches");
        partitions.push(PartitionSummary {
            name,
            samples,
            batches,
        });
    }

    Ok(RunSummary {
        rows: dataset.len(),
        num_features: dataset.num_features(),
        num_targets: dataset.num_targets(),
        partitions,
    })
}
