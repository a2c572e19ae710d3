//! In-memory table used by every pipeline stage.
//!
//! A [`Frame`] is an ordered list of uniquely named columns and a list of rows,
//! each row holding exactly one optional [`Value`] per column. `None` is the
//! null marker: failed numeric coercions, unmatched join keys and structural
//! gaps all end up as `None` rather than as errors.
//!
//! The datasets handled here are a few hundred counties wide, so the frame is
//! row-oriented and every transformation returns a new frame.

use std::collections::HashSet;

use crate::{data::Value, error::FrameError};

pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Frame {
    pub fn new(headers: Vec<String>) -> Result<Self, FrameError> {
        let mut seen = HashSet::with_capacity(headers.len());
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(FrameError::DuplicateColumn(header.clone()));
            }
        }
        Ok(Self {
            headers,
            rows: Vec::new(),
        })
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Row>) -> Result<Self, FrameError> {
        let mut frame = Self::new(headers)?;
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_column(&self, name: &str) -> Result<usize, FrameError> {
        self.column_index(name)
            .ok_or_else(|| FrameError::MissingColumn(name.to_string()))
    }

    pub fn push_row(&mut self, row: Row) -> Result<(), FrameError> {
        if row.len() != self.headers.len() {
            return Err(FrameError::RowWidth {
                row: self.rows.len(),
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).and_then(|cells| cells[idx].as_ref())
    }

    pub fn set_value(&mut self, row: usize, column: usize, value: Option<Value>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            *cell = value;
        }
    }

    pub fn add_column(&mut self, name: &str, values: Vec<Option<Value>>) -> Result<(), FrameError> {
        if self.has_column(name) {
            return Err(FrameError::DuplicateColumn(name.to_string()));
        }
        if values.len() != self.rows.len() {
            return Err(FrameError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), FrameError> {
        let idx = self.require_column(from)?;
        if from != to && self.has_column(to) {
            return Err(FrameError::DuplicateColumn(to.to_string()));
        }
        self.headers[idx] = to.to_string();
        Ok(())
    }

    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<(), FrameError>
    where
        F: FnMut(Option<Value>) -> Option<Value>,
    {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            let cell = row[idx].take();
            row[idx] = f(cell);
        }
        Ok(())
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Option<Value>]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Projects the frame onto `names`, in the order given. Names that do not exist are skipped.
    pub fn select<I, S>(&self, names: I) -> Frame
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut headers = Vec::new();
        let mut indices = Vec::new();
        for name in names {
            let name = name.as_ref();
            if let Some(idx) = self.column_index(name)
                && !indices.contains(&idx)
            {
                headers.push(name.to_string());
                indices.push(idx);
            }
        }
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|idx| row[*idx].clone()).collect())
            .collect();
        Frame { headers, rows }
    }

    pub fn head(&self, count: usize) -> Frame {
        Frame {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(count).cloned().collect(),
        }
    }
}
