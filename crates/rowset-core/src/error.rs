/// All errors that can occur within rowset.
///
/// Table construction, bounds checks, `.npy` decoding, split validation and
/// I/O all report through this one enum so callers can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Row (or sample) index past the end of a table or dataset.
    #[error("index out of bounds: index {index}, len {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Column index past the table width.
    #[error("column out of bounds: column {column}, ncols {ncols}")]
    ColumnOutOfBounds { column: usize, ncols: usize },

    /// Flat buffer does not match the requested `rows x cols`.
    #[error("element count mismatch: {rows}x{cols} requires {expected} elements, got {got}")]
    ElementCountMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        got: usize,
    },

    /// Rows of different widths passed to `SampleTable::from_rows`.
    #[error("ragged rows: row {row} has {got} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Array rank rowset cannot represent as a 2-D table.
    #[error("unsupported array shape {0:?}: only 0-, 1- and 2-D arrays are supported")]
    UnsupportedShape(Vec<usize>),

    /// `.npy` descr string that maps to no known element type.
    #[error("unsupported dtype descriptor '{0}'")]
    UnsupportedDType(String),

    /// File does not start with the `.npy` magic string.
    #[error("invalid magic: not an .npy file")]
    InvalidMagic,

    /// Malformed `.npy` header or payload.
    #[error("npy: {0}")]
    Npy(String),

    /// Bad split ratios.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// Bad loader, dataset or run configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// CSV import failure.
    #[error("csv: {0}")]
    Csv(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    pub(crate) fn npy(s: impl Into<String>) -> Self {
        Error::Npy(s.into())
    }
}

/// Convenience alias used throughout rowset.
pub type Result<T> = std::result::Result<T, Error>;
