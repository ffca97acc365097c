// Dataset Combinators — subset, concatenate, map datasets

use rowset_core::{Error, Result};

use crate::dataset::{check_index, Dataset, Sample};
use crate::transform::Transform;

// SubsetDataset — view of selected indices

/// A dataset that exposes only the samples at the given indices.
///
/// Works over any [`Dataset`]. For a [`crate::TableDataset`], prefer
/// [`crate::TableDataset::subset`], which composes mappings instead of
/// stacking views.
pub struct SubsetDataset<D: Dataset> {
    inner: D,
    indices: Vec<usize>,
}

impl<D: Dataset> SubsetDataset<D> {
    /// Create a subset of `inner` containing only the samples at `indices`.
    ///
    /// Stored indices are checked lazily: a bad one surfaces as the inner
    /// dataset's error at `get` time.
    pub fn new(inner: D, indices: Vec<usize>) -> Self {
        Self { inner, indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: Dataset> Dataset for SubsetDataset<D> {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        check_index(index, self.indices.len())?;
        self.inner.get(self.indices[index])
    }

    fn num_features(&self) -> usize {
        self.inner.num_features()
    }

    fn num_targets(&self) -> usize {
        self.inner.num_targets()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

// ConcatDataset — concatenate multiple datasets

/// Concatenate two or more datasets end-to-end.
///
/// All datasets must share the same feature and target widths.
pub struct ConcatDataset {
    datasets: Vec<Box<dyn Dataset>>,
    cumulative_sizes: Vec<usize>,
    num_features: usize,
    num_targets: usize,
}

impl ConcatDataset {
    /// Create a concatenation of the given datasets.
    pub fn new(datasets: Vec<Box<dyn Dataset>>) -> Result<Self> {
        let first = datasets.first().ok_or_else(|| {
            Error::InvalidConfig("ConcatDataset: need at least one dataset".to_string())
        })?;
        let num_features = first.num_features();
        let num_targets = first.num_targets();

        let mut cumulative_sizes = Vec::with_capacity(datasets.len());
        let mut total = 0;
        for ds in &datasets {
            if ds.num_features() != num_features || ds.num_targets() != num_targets {
                return Err(Error::InvalidConfig(format!(
                    "ConcatDataset: '{}' has {}+{} columns, expected {}+{}",
                    ds.name(),
                    ds.num_features(),
                    ds.num_targets(),
                    num_features,
                    num_targets
                )));
            }
            total += ds.len();
            cumulative_sizes.push(total);
        }

        Ok(Self {
            datasets,
            cumulative_sizes,
            num_features,
            num_targets,
        })
    }

    /// Locate which dataset and local index a global index maps to.
    fn locate(&self, index: usize) -> Result<(usize, usize)> {
        check_index(index, self.len())?;
        // First dataset whose cumulative size exceeds the index
        let ds_idx = self.cumulative_sizes.partition_point(|&cum| cum <= index);
        let offset = if ds_idx == 0 {
            0
        } else {
            self.cumulative_sizes[ds_idx - 1]
        };
        Ok((ds_idx, index - offset))
    }
}

impl Dataset for ConcatDataset {
    fn len(&self) -> usize {
        self.cumulative_sizes.last().copied().unwrap_or(0)
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let (ds_idx, local_idx) = self.locate(index)?;
        self.datasets[ds_idx].get(local_idx)
    }

    fn num_features(&self) -> usize {
        self.num_features
    }

    fn num_targets(&self) -> usize {
        self.num_targets
    }

    fn name(&self) -> &str {
        "concat"
    }
}

// MapDataset — apply a transform lazily

/// Wraps a dataset and applies a `Transform` lazily on each `get()`.
///
/// The transform must not change feature or target widths.
pub struct MapDataset<D: Dataset> {
    inner: D,
    transform: Box<dyn Transform>,
}

impl<D: Dataset> MapDataset<D> {
    pub fn new(inner: D, transform: Box<dyn Transform>) -> Self {
        Self { inner, transform }
    }
}

impl<D: Dataset> Dataset for MapDataset<D> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let sample = self.inner.get(index)?;
        Ok(self.transform.apply(sample))
    }

    fn num_features(&self) -> usize {
        self.inner.num_features()
    }

    fn num_targets(&self) -> usize {
        self.inner.num_targets()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    /// Tiny helper dataset for testing.
    #[derive(Clone)]
    struct TinyDataset {
        n: usize,
    }

    impl Dataset for TinyDataset {
        fn len(&self) -> usize {
            self.n
        }
        fn get(&self, idx: usize) -> Result<Sample> {
            check_index(idx, self.n)?;
            Ok(Sample {
                features: vec![idx as f64],
                target: vec![(idx % 3) as f64],
            })
        }
        fn num_features(&self) -> usize {
            1
        }
        fn num_targets(&self) -> usize {
            1
        }
    }

    #[test]
    fn subset_dataset() {
        let ds = TinyDataset { n: 10 };
        let sub = SubsetDataset::new(ds, vec![2, 5, 7]);
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.get(0).unwrap().features[0], 2.0);
        assert_eq!(sub.get(1).unwrap().features[0], 5.0);
        assert_eq!(sub.get(2).unwrap().features[0], 7.0);
    }

    #[test]
    fn subset_dataset_out_of_range() {
        let sub = SubsetDataset::new(TinyDataset { n: 10 }, vec![2, 5]);
        assert!(matches!(
            sub.get(2),
            Err(Error::IndexOutOfBounds { index: 2, len: 2 })
        ));
        // Bad stored index surfaces from the inner dataset
        let bad = SubsetDataset::new(TinyDataset { n: 3 }, vec![0, 8]);
        assert!(matches!(
            bad.get(1),
            Err(Error::IndexOutOfBounds { index: 8, len: 3 })
        ));
    }

    #[test]
    fn nested_subset_matches_composed() {
        let outer = vec![9, 1, 4, 6];
        let inner = vec![3, 0];
        let nested = SubsetDataset::new(SubsetDataset::new(TinyDataset { n: 10 }, outer.clone()), inner.clone());
        let composed: Vec<usize> = inner.iter().map(|&j| outer[j]).collect();
        let direct = SubsetDataset::new(TinyDataset { n: 10 }, composed);
        for i in 0..nested.len() {
            assert_eq!(nested.get(i).unwrap(), direct.get(i).unwrap());
        }
    }

    #[test]
    fn concat_dataset() {
        let ds1 = TinyDataset { n: 5 };
        let ds2 = TinyDataset { n: 3 };
        let concat = ConcatDataset::new(vec![Box::new(ds1), Box::new(ds2)]).unwrap();
        assert_eq!(concat.len(), 8);
        // First 5 come from ds1, next 3 from ds2
        assert_eq!(concat.get(0).unwrap().features[0], 0.0);
        assert_eq!(concat.get(4).unwrap().features[0], 4.0);
        assert_eq!(concat.get(5).unwrap().features[0], 0.0); // ds2 index 0
        assert_eq!(concat.get(7).unwrap().features[0], 2.0); // ds2 index 2
        assert!(concat.get(8).is_err());
    }

    #[test]
    fn concat_skips_empty_parts() {
        let concat = ConcatDataset::new(vec![
            Box::new(TinyDataset { n: 2 }),
            Box::new(TinyDataset { n: 0 }),
            Box::new(TinyDataset { n: 2 }),
        ])
        .unwrap();
        assert_eq!(concat.len(), 4);
        assert_eq!(concat.get(2).unwrap().features[0], 0.0);
    }

    #[test]
    fn concat_requires_datasets() {
        assert!(ConcatDataset::new(Vec::new()).is_err());
    }

    #[test]
    fn concat_rejects_width_mismatch() {
        use crate::table_dataset::TableDataset;
        use rowset_core::SampleTable;

        // 1 feature + 1 target vs 2 features + 1 target
        let wide = TableDataset::new(SampleTable::zeros(3, 3))
            .with_target_cols(&[2])
            .unwrap();
        let result = ConcatDataset::new(vec![Box::new(TinyDataset { n: 4 }), Box::new(wide)]);
        assert!(matches!(result, Err(Error::InvalidConfig(ref m)) if m.contains("columns")));
    }

    #[test]
    fn map_dataset() {
        use crate::transform::Normalize;
        let ds = TinyDataset { n: 4 };
        let mapped = MapDataset::new(ds, Box::new(Normalize::new(10.0)));
        assert_eq!(mapped.len(), 4);
        let s = mapped.get(2).unwrap();
        assert!((s.features[0] - 0.2).abs() < 1e-10);
    }
}
