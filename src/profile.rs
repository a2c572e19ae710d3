//! Column profile of a frame: inferred type, null counts, distinct values and
//! the documented meaning of each column.

use anyhow::Result;
use itertools::Itertools;

use crate::{
    data::Value,
    frame::Frame,
    schema::{ColumnSpec, describe_column},
};

pub const PROFILE_HEADERS: [&str; 6] = [
    "column",
    "type",
    "non_null",
    "null",
    "distinct",
    "description",
];
const UNDOCUMENTED: &str = "not relevant";

fn column_type_label<'a, I>(cells: I) -> &'static str
where
    I: Iterator<Item = &'a Value>,
{
    let types: Vec<_> = cells.map(Value::column_type).unique().collect();
    match types.as_slice() {
        [] => "empty",
        [single] => single.as_str(),
        _ => "mixed",
    }
}

fn present_cells(frame: &Frame, idx: usize) -> impl Iterator<Item = &Value> + '_ {
    frame.rows().iter().filter_map(move |row| row[idx].as_ref())
}

pub fn profile_columns(frame: &Frame, specs: &[ColumnSpec]) -> Result<Frame> {
    let mut profile = Frame::new(PROFILE_HEADERS.iter().map(|h| h.to_string()).collect())?;
    for (idx, name) in frame.headers().iter().enumerate() {
        let non_null = present_cells(frame, idx).count();
        let distinct = present_cells(frame, idx)
            .map(Value::as_display)
            .unique()
            .count();
        let description = describe_column(specs, name).unwrap_or(UNDOCUMENTED);
        profile.push_row(vec![
            Some(Value::String(name.clone())),
            Some(Value::String(column_type_label(present_cells(frame, idx)).to_string())),
            Some(Value::Integer(non_null as i64)),
            Some(Value::Integer((frame.row_count() - non_null) as i64)),
            Some(Value::Integer(distinct as i64)),
            Some(Value::String(description.to_string())),
        ])?;
    }
    Ok(profile)
}
