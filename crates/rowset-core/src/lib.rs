//! # rowset-core
//!
//! Core types for rowset.
//!
//! This crate provides:
//! - [`SampleTable`] — dense row-major `f64` table (rows = samples)
//! - [`DType`] — element types a table can be persisted as
//! - [`npy`] — reading and writing NumPy `.npy` files
//! - [`Error`] / [`Result`] — the error type shared by every rowset crate

pub mod dtype;
pub mod error;
pub mod npy;
pub mod table;

pub use dtype::DType;
pub use error::{Error, Result};
pub use npy::NpyHeader;
pub use table::{ColumnStats, SampleTable};
