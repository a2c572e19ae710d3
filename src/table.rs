//! Plain-text rendering of frames for console output.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    data::{Value, display_cell},
    frame::Frame,
};

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Numeric columns are right-aligned, everything else left-aligned.
fn column_alignments(frame: &Frame) -> Vec<Align> {
    (0..frame.column_count())
        .map(|idx| {
            let mut cells = frame.rows().iter().filter_map(|row| row[idx].as_ref()).peekable();
            let numeric = cells.peek().is_some()
                && cells.all(|value| matches!(value, Value::Integer(_) | Value::Float(_)));
            if numeric { Align::Right } else { Align::Left }
        })
        .collect()
}

pub fn render_frame(frame: &Frame) -> String {
    let rows = frame
        .rows()
        .iter()
        .map(|row| row.iter().map(display_cell).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    render_rows(frame.headers(), &rows, &column_alignments(frame))
}

pub fn print_frame(frame: &Frame) {
    print!("{}", render_frame(frame));
}

fn render_rows(headers: &[String], rows: &[Vec<String>], aligns: &[Align]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, aligns));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, aligns));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, aligns));
    }
    output
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .zip(aligns)
        .map(|((value, &width), align)| {
            let cell = sanitize_cell(value);
            match align {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            }
        })
        .collect::<Vec<_>>();
    cells.join(COLUMN_GAP).trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_frame_aligns_numbers_right_and_blanks_nulls() {
        let frame = Frame::from_rows(
            vec!["region_name".into(), "vehicle_count".into()],
            vec![
                vec![Some(Value::String("Kiel".into())), Some(Value::Integer(12))],
                vec![Some(Value::String("Flensburg".into())), None],
            ],
        )
        .unwrap();
        let rendered = render_frame(&frame);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "region_name  vehicle_count");
        assert_eq!(lines[1], "-----------  -------------");
        assert_eq!(lines[2], "Kiel                    12");
        assert_eq!(lines[3], "Flensburg");
    }

    #[test]
    fn sanitize_cell_flattens_line_breaks() {
        assert_eq!(sanitize_cell("a\nb"), "a b");
        assert!(matches!(sanitize_cell("ab"), Cow::Borrowed(_)));
    }
}
