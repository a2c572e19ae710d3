//! Long-to-wide reshaping of the vehicle stock.
//!
//! Input rows are `(region_id, region_name, drive_type, emission_class,
//! vehicle_units)`. The output has one row per county and, in order:
//!
//! 1. one `{drive}_{emission}` column per observed pair (absent pairs are 0),
//! 2. one marginal per drive type, named after the drive type,
//! 3. one marginal per emission class, named after the emission class,
//! 4. the grand total `vehicle_count`.
//!
//! Marginals are summed from the `(drive, emission)` pairs themselves rather
//! than by matching column name prefixes, so labels containing `_` cannot
//! leak into the wrong marginal and the total always equals both marginal sums.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Result, anyhow};
use log::debug;

use crate::{
    data::{Value, display_cell},
    frame::Frame,
    schema::{DRIVE_TYPE, EMISSION_CLASS, REGION_ID, REGION_NAME, VEHICLE_COUNT, VEHICLE_UNITS},
};

#[derive(Debug, Clone)]
pub struct VehiclePivot {
    pub frame: Frame,
    pub drive_types: Vec<String>,
    pub emission_classes: Vec<String>,
    pub combination_columns: Vec<String>,
}

type CategoryPair = (String, String);

fn accumulate(total: &mut i64, count: i64, region: &str, column: &str) -> Result<()> {
    *total = total.checked_add(count).ok_or_else(|| {
        anyhow!("Vehicle count overflow in region '{region}' for '{column}'")
    })?;
    Ok(())
}

pub fn combination_column(drive: &str, emission: &str) -> String {
    format!("{drive}_{emission}")
}

pub fn pivot_vehicles(frame: &Frame) -> Result<VehiclePivot> {
    let id_idx = frame.require_column(REGION_ID)?;
    let name_idx = frame.require_column(REGION_NAME)?;
    let drive_idx = frame.require_column(DRIVE_TYPE)?;
    let emission_idx = frame.require_column(EMISSION_CLASS)?;
    let units_idx = frame.require_column(VEHICLE_UNITS)?;

    let mut regions: BTreeMap<(String, String), HashMap<CategoryPair, i64>> = BTreeMap::new();
    let mut pairs: BTreeSet<CategoryPair> = BTreeSet::new();
    let mut skipped = 0usize;

    for row in frame.rows() {
        let (Some(drive), Some(emission)) = (&row[drive_idx], &row[emission_idx]) else {
            skipped += 1;
            continue;
        };
        let pair = (drive.as_display(), emission.as_display());
        let units = row[units_idx].as_ref().and_then(Value::as_i64).unwrap_or(0);
        let region = (display_cell(&row[id_idx]), display_cell(&row[name_idx]));
        let column = combination_column(&pair.0, &pair.1);
        let label = region.0.clone();
        let cell = regions
            .entry(region)
            .or_default()
            .entry(pair.clone())
            .or_insert(0);
        accumulate(cell, units, &label, &column)?;
        pairs.insert(pair);
    }
    if skipped > 0 {
        debug!("Pivot skipped {skipped} row(s) without drive type or emission class");
    }

    let drive_types: Vec<String> = pairs
        .iter()
        .map(|(drive, _)| drive.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let emission_classes: Vec<String> = pairs
        .iter()
        .map(|(_, emission)| emission.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let combination_columns: Vec<String> = pairs
        .iter()
        .map(|(drive, emission)| combination_column(drive, emission))
        .collect();

    let mut headers = vec![REGION_ID.to_string(), REGION_NAME.to_string()];
    headers.extend(combination_columns.iter().cloned());
    headers.extend(drive_types.iter().cloned());
    headers.extend(emission_classes.iter().cloned());
    headers.push(VEHICLE_COUNT.to_string());
    let mut wide = Frame::new(headers)?;

    for ((region_id, region_name), counts) in regions {
        let mut drive_totals: HashMap<&str, i64> = HashMap::new();
        let mut emission_totals: HashMap<&str, i64> = HashMap::new();
        let mut row = vec![
            Some(Value::String(region_id.clone())),
            Some(Value::String(region_name)),
        ];
        for pair in &pairs {
            let count = counts.get(pair).copied().unwrap_or(0);
            let drive_total = drive_totals.entry(pair.0.as_str()).or_insert(0);
            accumulate(drive_total, count, &region_id, &pair.0)?;
            let emission_total = emission_totals.entry(pair.1.as_str()).or_insert(0);
            accumulate(emission_total, count, &region_id, &pair.1)?;
            row.push(Some(Value::Integer(count)));
        }
        let mut total = 0i64;
        for count in drive_totals.values() {
            accumulate(&mut total, *count, &region_id, VEHICLE_COUNT)?;
        }
        row.extend(
            drive_types
                .iter()
                .map(|drive| Some(Value::Integer(drive_totals[drive.as_str()]))),
        );
        row.extend(
            emission_classes
                .iter()
                .map(|emission| Some(Value::Integer(emission_totals[emission.as_str()]))),
        );
        row.push(Some(Value::Integer(total)));
        wide.push_row(row)?;
    }

    Ok(VehiclePivot {
        frame: wide,
        drive_types,
        emission_classes,
        combination_columns,
    })
}
