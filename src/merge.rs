use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    frame::{Frame, Row},
    keys::lookup_key,
    schema::{ACCIDENTS, INCOME, POPULATION, REGION_ID},
};

/// Left outer join on `key`. Every left row is kept in order; a left row that
/// matches several right rows is emitted once per match. Right columns other
/// than the key are appended, renamed `right_{name}_{n}` if the left side
/// already has a column of that name.
pub fn left_join(left: &Frame, right: &Frame, key: &str) -> Result<Frame> {
    let left_key = left
        .require_column(key)
        .context("Resolving left join key")?;
    let right_key = right
        .require_column(key)
        .context("Resolving right join key")?;

    let right_lookup = build_right_lookup(right, right_key);
    let (headers, right_columns) = build_output_headers(left.headers(), right.headers(), right_key);
    let mut joined = Frame::new(headers)?;

    let mut matched_rows = 0usize;
    let mut unmatched_rows = 0usize;
    for row in left.rows() {
        let bucket = lookup_key(&row[left_key]).and_then(|key| right_lookup.get(&key));
        match bucket {
            Some(bucket) => {
                for right_row in bucket {
                    let mut combined = row.clone();
                    combined.extend(right_columns.iter().map(|idx| right_row[*idx].clone()));
                    joined.push_row(combined)?;
                    matched_rows += 1;
                }
            }
            None => {
                let mut combined = row.clone();
                combined.extend(right_columns.iter().map(|_| None));
                joined.push_row(combined)?;
                unmatched_rows += 1;
            }
        }
    }

    if unmatched_rows > 0 {
        warn!("Join on '{key}': {unmatched_rows} left row(s) without a match");
    }
    info!(
        "Join on '{key}' complete: {} output row(s), {} matched row(s)",
        joined.row_count(),
        matched_rows
    );
    Ok(joined)
}

/// Joins the vehicle aggregate with income, population and accident rates.
/// Each right table contributes only its value column.
pub fn merge_sources(
    vehicles: &Frame,
    income: &Frame,
    population: &Frame,
    accidents: &Frame,
) -> Result<Frame> {
    let mut merged = vehicles.clone();
    for (name, table, value_column) in [
        ("income", income, INCOME),
        ("population", population, POPULATION),
        ("accidents", accidents, ACCIDENTS),
    ] {
        let narrowed = table.select([REGION_ID, value_column]);
        merged = left_join(&merged, &narrowed, REGION_ID)
            .with_context(|| format!("Merging {name} data"))?;
    }
    Ok(merged)
}

fn build_right_lookup(right: &Frame, key_idx: usize) -> HashMap<String, Vec<&Row>> {
    let mut map: HashMap<String, Vec<&Row>> = HashMap::new();
    for row in right.rows() {
        if let Some(key) = lookup_key(&row[key_idx]) {
            map.entry(key).or_default().push(row);
        }
    }
    map
}

fn build_output_headers(
    left_headers: &[String],
    right_headers: &[String],
    right_key_idx: usize,
) -> (Vec<String>, Vec<usize>) {
    let mut headers = left_headers.to_vec();
    let mut seen: HashSet<String> = headers.iter().cloned().collect();
    let mut right_columns = Vec::new();

    for (idx, name) in right_headers.iter().enumerate() {
        if idx == right_key_idx {
            continue;
        }
        let mut candidate = name.clone();
        if seen.contains(&candidate) {
            let mut counter = 1usize;
            while seen.contains(&candidate) {
                candidate = format!("right_{name}_{counter}");
                counter += 1;
            }
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
        right_columns.push(idx);
    }

    (headers, right_columns)
}
