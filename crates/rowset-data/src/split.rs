// Train / Validation / Test Split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};
use serde::Deserialize;

use rowset_core::{Error, Result};

use crate::combinators::SubsetDataset;
use crate::dataset::Dataset;
use crate::table_dataset::TableDataset;

/// How to partition a dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// 2 or 3 fractions that sum to 1.0, e.g. `[0.8, 0.2]` or
    /// `[0.7, 0.15, 0.15]`.
    pub ratios: Vec<f64>,
    /// Random seed for reproducible shuffling of indices.
    pub seed: Option<u64>,
    /// Shuffle before cutting. When off, partitions are contiguous.
    pub shuffle: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            ratios: vec![0.8, 0.2],
            seed: None,
            shuffle: true,
        }
    }
}

impl SplitConfig {
    pub fn ratios(mut self, r: &[f64]) -> Self {
        self.ratios = r.to_vec();
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    /// Check ratio count, range and sum.
    pub fn validate(&self) -> Result<()> {
        if !(2..=3).contains(&self.ratios.len()) {
            return Err(Error::InvalidSplit(format!(
                "ratios must have 2 or 3 elements, got {}",
                self.ratios.len()
            )));
        }
        if let Some(r) = self.ratios.iter().find(|&&r| !(r > 0.0 && r < 1.0)) {
            return Err(Error::InvalidSplit(format!(
                "each ratio must be in (0, 1), got {r}"
            )));
        }
        let sum: f64 = self.ratios.iter().sum();
        if (sum - 1.0).abs() >= 1e-6 {
            return Err(Error::InvalidSplit(format!(
                "ratios must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Partition `0..n` into disjoint index lists, one per ratio.
///
/// Every partition but the last takes `round(n * ratio)` indices; the last
/// takes the remainder.
pub fn split_indices(n: usize, config: &SplitConfig) -> Result<Vec<Vec<usize>>> {
    config.validate()?;

    let mut indices: Vec<usize> = (0..n).collect();
    if config.shuffle {
        match config.seed {
            Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => indices.shuffle(&mut thread_rng()),
        }
    }

    let mut splits = Vec::with_capacity(config.ratios.len());
    let mut offset = 0;
    for (i, &ratio) in config.ratios.iter().enumerate() {
        let count = if i == config.ratios.len() - 1 {
            n - offset
        } else {
            (n as f64 * ratio).round() as usize
        };
        let end = (offset + count).min(n);
        splits.push(indices[offset..end].to_vec());
        offset = end;
    }

    log::debug!(
        "split {} samples into {:?}",
        n,
        splits.iter().map(Vec::len).collect::<Vec<_>>()
    );
    Ok(splits)
}

/// Split any cloneable dataset into [`SubsetDataset`] views.
pub fn train_test_split<D>(dataset: D, config: &SplitConfig) -> Result<Vec<SubsetDataset<D>>>
where
    D: Dataset + Clone,
{
    let splits = split_indices(dataset.len(), config)?;
    Ok(splits
        .into_iter()
        .map(|idx| SubsetDataset::new(dataset.clone(), idx))
        .collect())
}

impl TableDataset {
    /// Split this view into partitions that each map straight into the table.
    pub fn split(&self, config: &SplitConfig) -> Result<Vec<TableDataset>> {
        split_indices(self.len(), config)?
            .iter()
            .map(|idx| self.subset(idx))
            .collect()
    }
}

/// Named train / validation / test partitions.
#[derive(Debug, Clone)]
pub struct Partitions<T> {
    pub train: T,
    pub val: T,
    pub test: Option<T>,
}

impl<T> Partitions<T> {
    /// Name the output of a 2- or 3-way split.
    pub fn from_splits(splits: Vec<T>) -> Result<Self> {
        let n = splits.len();
        let mut it = splits.into_iter();
        match (it.next(), it.next(), it.next(), it.next()) {
            (Some(train), Some(val), test, None) => Ok(Self { train, val, test }),
            _ => Err(Error::InvalidSplit(format!(
                "expected 2 or 3 partitions, got {n}"
            ))),
        }
    }

    /// `(name, partition)` pairs in train, val, test order.
    pub fn named(&self) -> Vec<(&'static str, &T)> {
        let mut out = vec![("train", &self.train), ("val", &self.val)];
        if let Some(test) = &self.test {
            out.push(("test", test));
        }
        out
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use rowset_core::SampleTable;

    fn ids(n: usize) -> TableDataset {
        let t = SampleTable::new((0..n).map(|i| i as f64).collect(), n, 1).unwrap();
        TableDataset::new(t)
    }

    #[test]
    fn two_way() {
        let splits = split_indices(100, &SplitConfig::default().seed(42)).unwrap();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].len(), 80);
        assert_eq!(splits[1].len(), 20);
    }

    #[test]
    fn three_way_covers_everything_once() {
        let cfg = SplitConfig::default().ratios(&[0.7, 0.15, 0.15]).seed(7);
        let splits = split_indices(101, &cfg).unwrap();
        assert_eq!(splits.len(), 3);
        let mut all: Vec<usize> = splits.concat();
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());
    }

    #[test]
    fn reproducible_with_seed() {
        let cfg = SplitConfig::default().seed(123);
        assert_eq!(split_indices(50, &cfg).unwrap(), split_indices(50, &cfg).unwrap());
    }

    #[test]
    fn no_shuffle_is_contiguous() {
        let cfg = SplitConfig::default().ratios(&[0.5, 0.5]).shuffle(false);
        let splits = split_indices(6, &cfg).unwrap();
        assert_eq!(splits, vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn invalid_ratios() {
        let cases: [&[f64]; 4] = [&[1.0], &[0.5, 0.3], &[0.25; 4], &[1.2, -0.2]];
        for r in cases {
            let err = split_indices(10, &SplitConfig::default().ratios(r)).unwrap_err();
            assert!(matches!(err, Error::InvalidSplit(_)), "{r:?}");
        }
    }

    #[test]
    fn tiny_dataset_last_split_gets_remainder() {
        let cfg = SplitConfig::default().ratios(&[0.7, 0.15, 0.15]).seed(1);
        let splits = split_indices(3, &cfg).unwrap();
        assert_eq!(splits[0].len(), 2);
        assert_eq!(splits[1].len(), 0);
        assert_eq!(splits[2].len(), 1);
    }

    #[test]
    fn table_split_maps_into_table() {
        let ds = ids(20);
        let parts = ds
            .split(&SplitConfig::default().ratios(&[0.5, 0.5]).seed(3))
            .unwrap();
        for p in &parts {
            for i in 0..p.len() {
                let row = p.resolve(i).unwrap();
                assert_eq!(p.get(i).unwrap().features[0], row as f64);
            }
        }
    }

    #[test]
    fn generic_split() {
        let splits = train_test_split(ids(10), &SplitConfig::default().seed(9)).unwrap();
        assert_eq!(splits[0].len() + splits[1].len(), 10);
        assert_eq!(splits[0].len(), 8);
    }

    #[test]
    fn partitions() {
        let p = Partitions::from_splits(vec![1, 2, 3]).unwrap();
        assert_eq!(p.test, Some(3));
        let names: Vec<&str> = p.named().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["train", "val", "test"]);
        assert!(Partitions::from_splits(vec![1]).is_err());
        assert!(Partitions::from_splits(vec![1, 2, 3, 4]).is_err());
    }
}
