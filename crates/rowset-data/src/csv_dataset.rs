// CSV import — read numeric CSV files into a SampleTable
//
// Every field must parse as f64. The caller decides afterwards which columns
// are targets (see TableDataset::with_target_cols).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use rowset_core::{Error, Result, SampleTable};

use crate::table_dataset::TableDataset;

/// Configuration for reading a CSV file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Whether the first row is a header (to be skipped).
    pub has_header: bool,
    /// Delimiter character (default: `,`).
    pub delimiter: u8,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
        }
    }
}

impl CsvConfig {
    pub fn has_header(mut self, h: bool) -> Self {
        self.has_header = h;
        self
    }

    pub fn delimiter(mut self, d: u8) -> Self {
        self.delimiter = d;
        self
    }
}

/// Read a CSV file from disk.
pub fn read_table(path: impl AsRef<Path>, config: &CsvConfig) -> Result<SampleTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = table_from_reader(file, config)?;
    log::debug!(
        "read {}x{} table from {}",
        table.nrows(),
        table.ncols(),
        path.display()
    );
    Ok(table)
}

/// Parse CSV from any reader.
pub fn table_from_reader<R: Read>(reader: R, config: &CsvConfig) -> Result<SampleTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(config.has_header)
        .delimiter(config.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_width = if config.has_header {
        Some(rdr.headers().map_err(|e| Error::Csv(e.to_string()))?.len())
    } else {
        None
    };

    let mut data = Vec::new();
    let mut cols = None;
    let mut rows = 0;

    for record in rdr.records() {
        let record = record.map_err(|e| Error::Csv(e.to_string()))?;
        let line = record.position().map_or(0, |p| p.line());

        // Lines with only whitespace come through as a single empty field
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }

        // The header, when present, fixes the width
        let width = *cols.get_or_insert(header_width.unwrap_or(record.len()));
        if record.len() != width {
            return Err(Error::Csv(format!(
                "line {line} has {} columns, expected {width}",
                record.len()
            )));
        }

        for (c, field) in record.iter().enumerate() {
            let v: f64 = field.parse().map_err(|e| {
                Error::Csv(format!("line {line}, col {c}: parse error: {e}"))
            })?;
            data.push(v);
        }
        rows += 1;
    }

    let cols = cols.ok_or_else(|| Error::Csv("no data rows".to_string()))?;
    SampleTable::new(data, rows, cols)
}

impl TableDataset {
    /// Load a CSV file as a dataset. All columns start out as features.
    pub fn from_csv(path: impl AsRef<Path>, config: &CsvConfig) -> Result<Self> {
        Ok(Self::new(read_table(path, config)?).with_name("csv"))
    }
}

// Tests
