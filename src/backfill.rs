//! Repair of null values left behind by the merge.
//!
//! Some reference tables key a county by a short code that the vehicle export
//! pads with a trailing zero (`08117` vs `081170`). For every row where the
//! target column is null, the row's key is shortened with
//! [`short_region_key`] and looked up in the reference table.

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    data::display_cell,
    frame::Frame,
    keys::{lookup_key, short_region_key},
    schema::{REGION_ID, REGION_NAME},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    pub column: String,
    pub missing: usize,
    pub fixed: usize,
    /// Region names (or ids when the name is unknown) still null after the pass.
    pub still_missing: Vec<String>,
}

impl BackfillReport {
    pub fn is_complete(&self) -> bool {
        self.still_missing.is_empty()
    }
}

/// Fills nulls of `column` in `frame` from `reference`. Returns the repaired
/// frame together with a report of what was missing, fixed and still missing.
pub fn backfill_missing(
    frame: &Frame,
    reference: &Frame,
    column: &str,
) -> Result<(Frame, BackfillReport)> {
    let target_idx = frame
        .require_column(column)
        .with_context(|| format!("Backfilling '{column}'"))?;
    let key_idx = frame
        .require_column(REGION_ID)
        .with_context(|| format!("Backfilling '{column}'"))?;
    let reference_key = reference
        .require_column(REGION_ID)
        .context("Resolving reference key")?;
    let reference_value = reference
        .require_column(column)
        .with_context(|| format!("Resolving reference column '{column}'"))?;
    let name_idx = frame.column_index(REGION_NAME);

    let mut repaired = frame.clone();
    let mut report = BackfillReport {
        column: column.to_string(),
        missing: 0,
        fixed: 0,
        still_missing: Vec::new(),
    };

    for row_idx in 0..frame.row_count() {
        let row = &frame.rows()[row_idx];
        if row[target_idx].is_some() {
            continue;
        }
        report.missing += 1;
        let key = lookup_key(&row[key_idx]);
        let fallback = key.as_deref().map(short_region_key).and_then(|short_key| {
            reference.rows().iter().find_map(|candidate| {
                (lookup_key(&candidate[reference_key]).as_deref() == Some(short_key))
                    .then(|| candidate[reference_value].clone())
                    .flatten()
            })
        });
        match fallback {
            Some(value) => {
                repaired.set_value(row_idx, target_idx, Some(value));
                report.fixed += 1;
            }
            None => {
                let label = name_idx
                    .map(|idx| display_cell(&row[idx]))
                    .filter(|name| !name.is_empty())
                    .or(key)
                    .unwrap_or_else(|| format!("row {}", row_idx + 1));
                warn!("No value for '{column}' in region '{label}' after backfill");
                report.still_missing.push(label);
            }
        }
    }

    if report.missing > 0 {
        info!(
            "Backfill '{}': {} missing, {} fixed, {} still missing",
            column,
            report.missing,
            report.fixed,
            report.still_missing.len()
        );
    }
    Ok((repaired, report))
}
