//! Regional key normalization.
//!
//! County keys arrive in two shapes depending on the export: zero-padded
//! (`08111`) and with a trailing zero appended to a short code (`081170` for
//! `08117`). Joining uses the leading-zero strip; the backfill lookup uses the
//! trailing-zero strip. The two are deliberately kept apart because they do not
//! agree in general.

use crate::{data::Value, frame::Frame, schema::REGION_ID, transform::string_ops};

pub use crate::transform::string_ops::{strip_leading_zeros, strip_trailing_zeros};

/// Strips leading zeros from `region_id`, treating the key as text.
/// Frames without the column are returned unchanged.
pub fn normalize_region_keys(frame: &Frame) -> Frame {
    let mut normalized = frame.clone();
    if let Some(idx) = normalized.column_index(REGION_ID) {
        for row in 0..normalized.row_count() {
            let key = normalized.rows()[row][idx].as_ref().map(|value| {
                Value::String(string_ops::strip_leading_zeros(&value.as_display()).to_string())
            });
            normalized.set_value(row, idx, key);
        }
    }
    normalized
}

/// Text of a key cell for lookups. Null keys and keys that normalized to the
/// empty string match nothing.
pub fn lookup_key(cell: &Option<Value>) -> Option<String> {
    cell.as_ref()
        .map(Value::as_display)
        .filter(|key| !key.is_empty())
}

/// Short form of a key used by some reference tables.
pub fn short_region_key(key: &str) -> &str {
    strip_trailing_zeros(key)
}
