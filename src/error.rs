//! Structural errors raised by [`crate::frame::Frame`] operations.
//!
//! Data problems (unparseable numbers, unmatched keys) are never errors in this
//! crate; they surface as null cells. Only shape violations end up here.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Column '{0}' not found")]
    MissingColumn(String),
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),
    #[error("Row {row} has {found} cell(s) but the frame has {expected} column(s)")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Column '{column}' has {found} value(s) but the frame has {expected} row(s)")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}
