use std::sync::OnceLock;

use anyhow::Result;
use log::debug;
use regex::Regex;

use crate::{data::display_cell, frame::Frame};

/// County names of regions dissolved by a territorial reform end in a
/// parenthesised validity note, e.g. `Aachen, Kreis (bis 20.10.2009)`.
fn superseded_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\)\s*$").expect("valid superseded-region pattern"))
}

/// Drops rows with any null cell. In the vehicle export these are the
/// pre-aggregated rows that carry no drive type or emission class.
pub fn drop_incomplete_rows(frame: &Frame) -> Frame {
    let mut filtered = frame.clone();
    filtered.retain_rows(|row| row.iter().all(Option::is_some));
    log_dropped("incomplete", frame, &filtered);
    filtered
}

pub fn drop_superseded_regions(frame: &Frame, column: &str) -> Result<Frame> {
    let idx = frame.require_column(column)?;
    let pattern = superseded_pattern();
    let mut filtered = frame.clone();
    filtered.retain_rows(|row| !pattern.is_match(&display_cell(&row[idx])));
    log_dropped("superseded", frame, &filtered);
    Ok(filtered)
}

/// Keeps only rows where every given column is null, e.g. population totals
/// that are not broken down by age group or sex.
pub fn keep_null_rows(frame: &Frame, columns: &[&str]) -> Result<Frame> {
    let indices = columns
        .iter()
        .map(|column| frame.require_column(column))
        .collect::<Result<Vec<_>, _>>()?;
    let mut filtered = frame.clone();
    filtered.retain_rows(|row| indices.iter().all(|idx| row[*idx].is_none()));
    log_dropped("broken-down", frame, &filtered);
    Ok(filtered)
}

fn log_dropped(kind: &str, before: &Frame, after: &Frame) {
    let dropped = before.row_count() - after.row_count();
    if dropped > 0 {
        debug!("Dropped {dropped} {kind} row(s), {} remaining", after.row_count());
    }
}
