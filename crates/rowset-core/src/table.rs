// SampleTable — the fixed 2-D array of stored data points
//
// Row-major f64 storage: element (r, c) lives at `data[r * cols + c]`.
// Rows are samples, columns are features (and optionally targets).

use crate::error::{Error, Result};

/// Per-column summary statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// A dense, row-major table of `f64` samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleTable {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl SampleTable {
    /// Build a table from a flat row-major buffer.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| Error::msg(format!("table shape {rows}x{cols} is too large")))?;
        if data.len() != expected {
            return Err(Error::ElementCountMismatch {
                rows,
                cols,
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// A `rows x cols` table filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Build a table from a list of equally wide rows.
    ///
    /// An empty list yields a `0 x 0` table.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::RaggedRows {
                    row: i,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Borrow row `index`.
    pub fn row(&self, index: usize) -> Result<&[f64]> {
        if index >= self.rows {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.rows,
            });
        }
        let start = index * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_col(col)?;
        Ok(self.row(row)?[col])
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact(0) panics, and a zero-width table still has `rows` rows.
        (0..self.rows).map(move |r| &self.data[r * self.cols..(r + 1) * self.cols])
    }

    /// Gather rows in the given order. Duplicates are allowed.
    pub fn select_rows(&self, indices: &[usize]) -> Result<SampleTable> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i)?);
        }
        Ok(Self {
            data,
            rows: indices.len(),
            cols: self.cols,
        })
    }

    /// Gather columns in the given order.
    pub fn select_cols(&self, cols: &[usize]) -> Result<SampleTable> {
        for &c in cols {
            self.check_col(c)?;
        }
        let mut data = Vec::with_capacity(self.rows * cols.len());
        for row in self.rows() {
            data.extend(cols.iter().map(|&c| row[c]));
        }
        Ok(Self {
            data,
            rows: self.rows,
            cols: cols.len(),
        })
    }

    /// Mean, population std, min and max of every column.
    pub fn column_stats(&self) -> Vec<ColumnStats> {
        if self.rows == 0 {
            return Vec::new();
        }
        let n = self.rows as f64;
        (0..self.cols)
            .map(|c| {
                let mut sum = 0.0;
                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                for row in self.rows() {
                    let v = row[c];
                    sum += v;
                    min = min.min(v);
                    max = max.max(v);
                }
                let mean = sum / n;
                let var = self.rows().map(|row| (row[c] - mean).powi(2)).sum::<f64>() / n;
                ColumnStats {
                    mean,
                    std: var.sqrt(),
                    min,
                    max,
                }
            })
            .collect()
    }

    fn check_col(&self, col: usize) -> Result<()> {
        if col >= self.cols {
            return Err(Error::ColumnOutOfBounds {
                column: col,
                ncols: self.cols,
            });
        }
        Ok(())
    }
}
