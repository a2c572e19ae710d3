//! Derived feature columns on the merged county table.

use anyhow::{Context, Result};

use crate::{
    data::Value,
    frame::{Frame, Row},
    schema::{POPULATION, REGION_NAME, VEHICLE_COUNT, VEHICLES_PER_CAPITA},
};

pub const PERCENT_SUFFIX: &str = "_pct";

pub fn percent_column(column: &str) -> String {
    format!("{column}{PERCENT_SUFFIX}")
}

/// `numerator / denominator`, null when either side is null or the denominator is zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

fn numeric(row: &Row, idx: usize) -> Option<f64> {
    row[idx].as_ref().and_then(Value::as_f64)
}

/// Appends `vehicles_per_capita = vehicle_count / (population_in_thousands * 1000)`.
pub fn derive_vehicles_per_capita(frame: &Frame) -> Result<Frame> {
    let count_idx = frame.require_column(VEHICLE_COUNT)?;
    let population_idx = frame.require_column(POPULATION)?;
    let values = frame
        .rows()
        .iter()
        .map(|row| {
            let residents = numeric(row, population_idx).map(|thousands| thousands * 1000.0);
            ratio(numeric(row, count_idx), residents).map(Value::Float)
        })
        .collect();
    let mut derived = frame.clone();
    derived
        .add_column(VEHICLES_PER_CAPITA, values)
        .context("Deriving vehicles per capita")?;
    Ok(derived)
}

fn row_shares(row: &Row, indices: &[usize]) -> Vec<Option<Value>> {
    let cells: Vec<Option<f64>> = indices.iter().map(|idx| numeric(row, *idx)).collect();
    let total: f64 = cells.iter().flatten().sum();
    cells
        .into_iter()
        .map(|cell| ratio(cell, Some(total)).map(|share| Value::Float(share * 100.0)))
        .collect()
}

fn resolve_columns(frame: &Frame, columns: &[String]) -> Result<Vec<usize>> {
    columns
        .iter()
        .map(|column| frame.require_column(column).map_err(Into::into))
        .collect()
}

/// `region_name` plus the given group columns, e.g. the drive type marginals.
pub fn grouped_table(frame: &Frame, columns: &[String]) -> Result<Frame> {
    resolve_columns(frame, columns)?;
    Ok(frame.select(std::iter::once(REGION_NAME).chain(columns.iter().map(String::as_str))))
}

/// Like [`grouped_table`], with each value expressed as a percentage of its row sum.
pub fn percentage_table(frame: &Frame, columns: &[String]) -> Result<Frame> {
    let grouped = grouped_table(frame, columns)?;
    let indices = resolve_columns(&grouped, columns)?;
    let name_idx = grouped.column_index(REGION_NAME);
    let mut shares = Frame::new(grouped.headers().to_vec())?;
    for row in grouped.rows() {
        let mut out = Vec::with_capacity(grouped.column_count());
        if let Some(idx) = name_idx {
            out.push(row[idx].clone());
        }
        out.extend(row_shares(row, &indices));
        shares.push_row(out)?;
    }
    Ok(shares)
}

/// Appends one `{column}_pct` column per group column, holding the row-wise share in percent.
pub fn append_percentages(frame: &Frame, columns: &[String]) -> Result<Frame> {
    let indices = resolve_columns(frame, columns)?;
    let per_row: Vec<Vec<Option<Value>>> = frame
        .rows()
        .iter()
        .map(|row| row_shares(row, &indices))
        .collect();
    let mut derived = frame.clone();
    for (position, column) in columns.iter().enumerate() {
        let values = per_row.iter().map(|shares| shares[position].clone()).collect();
        derived
            .add_column(&percent_column(column), values)
            .with_context(|| format!("Deriving percentage share of '{column}'"))?;
    }
    Ok(derived)
}

/// Narrows the table to the predictor/response columns that are present.
pub fn correlation_table(frame: &Frame, columns: &[String]) -> Frame {
    frame.select(columns)
}
