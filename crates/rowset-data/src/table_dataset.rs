// TableDataset — dataset view over a shared SampleTable
//
// The table is loaded once and shared read-only through an Arc. A view adds
// an optional subset mapping (external index -> table row) and a column
// split into features and targets. Taking a subset of a view composes the
// mappings, so every view is exactly one level of indirection away from the
// table no matter how many times it was subset.

use std::path::Path;
use std::sync::Arc;

use rowset_core::{npy, DType, Error, Result, SampleTable};

use crate::dataset::{check_index, Dataset, Sample};

/// A dataset backed by an in-memory [`SampleTable`].
#[derive(Debug, Clone)]
pub struct TableDataset {
    table: Arc<SampleTable>,
    mapping: Option<Arc<[usize]>>,
    feature_cols: Arc<[usize]>,
    target_cols: Arc<[usize]>,
    dataset_name: String,
}

impl TableDataset {
    /// Wrap a table. Every row is a sample and every column a feature.
    pub fn new(table: SampleTable) -> Self {
        Self::from_shared(Arc::new(table))
    }

    /// Wrap an already shared table.
    pub fn from_shared(table: Arc<SampleTable>) -> Self {
        let feature_cols: Arc<[usize]> = (0..table.ncols()).collect();
        Self {
            table,
            mapping: None,
            feature_cols,
            target_cols: Arc::from(Vec::new()),
            dataset_name: "table".to_string(),
        }
    }

    /// Load the table from an `.npy` file.
    pub fn from_npy(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = npy::load(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string();
        Ok(Self::new(table).with_name(&name))
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.dataset_name = name.to_string();
        self
    }

    /// Use `cols` as target columns. All other columns become features.
    pub fn with_target_cols(mut self, cols: &[usize]) -> Result<Self> {
        let ncols = self.table.ncols();
        for (i, &c) in cols.iter().enumerate() {
            if c >= ncols {
                return Err(Error::ColumnOutOfBounds { column: c, ncols });
            }
            if cols[..i].contains(&c) {
                return Err(Error::InvalidConfig(format!(
                    "target column {c} listed twice"
                )));
            }
        }
        self.feature_cols = (0..ncols).filter(|c| !cols.contains(c)).collect();
        self.target_cols = cols.into();
        Ok(self)
    }

    /// Install a subset mapping given directly in table rows.
    ///
    /// Replaces any existing mapping. Use [`subset`](Self::subset) to select
    /// relative to the current view instead.
    pub fn with_indices(mut self, indices: Vec<usize>) -> Result<Self> {
        let rows = self.table.nrows();
        if let Some(&bad) = indices.iter().find(|&&i| i >= rows) {
            return Err(Error::IndexOutOfBounds {
                index: bad,
                len: rows,
            });
        }
        self.mapping = Some(indices.into());
        Ok(self)
    }

    /// The underlying table.
    pub fn table(&self) -> &Arc<SampleTable> {
        &self.table
    }

    /// Whether this view carries a subset mapping.
    pub fn is_subset(&self) -> bool {
        self.mapping.is_some()
    }

    pub fn feature_cols(&self) -> &[usize] {
        &self.feature_cols
    }

    pub fn target_cols(&self) -> &[usize] {
        &self.target_cols
    }

    /// Translate an external index into a table row.
    pub fn resolve(&self, index: usize) -> Result<usize> {
        check_index(index, self.len())?;
        Ok(match &self.mapping {
            Some(m) => m[index],
            None => index,
        })
    }

    /// A view over `indices` of this view.
    ///
    /// The result satisfies `sub.resolve(j) == self.resolve(indices[j])`.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        let composed = indices
            .iter()
            .map(|&i| self.resolve(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            mapping: Some(composed.into()),
            ..self.clone()
        })
    }

    /// The table rows this view exposes, in order.
    pub fn indices(&self) -> Vec<usize> {
        match &self.mapping {
            Some(m) => m.to_vec(),
            None => (0..self.table.nrows()).collect(),
        }
    }

    /// Copy the rows of this view (all columns) into a new table.
    pub fn to_table(&self) -> Result<SampleTable> {
        match &self.mapping {
            Some(m) => self.table.select_rows(m),
            None => Ok(self.table.as_ref().clone()),
        }
    }

    /// Materialize this view and save it as `.npy`.
    pub fn save_npy(&self, path: impl AsRef<Path>, dtype: DType) -> Result<()> {
        npy::save(path, &self.to_table()?, dtype)
    }
}

impl Dataset for TableDataset {
    fn len(&self) -> usize {
        match &self.mapping {
            Some(m) => m.len(),
            None => self.table.nrows(),
        }
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let row = self.table.row(self.resolve(index)?)?;
        Ok(Sample {
            features: self.feature_cols.iter().map(|&c| row[c]).collect(),
            target: self.target_cols.iter().map(|&c| row[c]).collect(),
        })
    }

    fn num_features(&self) -> usize {
        self.feature_cols.len()
    }

    fn num_targets(&self) -> usize {
        self.target_cols.len()
    }

    fn name(&self) -> &str {
        &self.dataset_name
    }
}

// Tests
