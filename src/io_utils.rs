//! CSV reading and writing for the pipeline.
//!
//! All file I/O flows through this module:
//!
//! - **Encoding**: raw exports are decoded per field with `encoding_rs`
//!   (the vehicle stock file is UTF-8, the others ISO-8859-1).
//! - **Reading**: [`read_frame`] loads a whole file into a [`Frame`] of text
//!   cells; empty fields become nulls.
//! - **Writing**: [`write_frame`] emits comma-separated UTF-8 without a row index.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow, ensure};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::{
    data::{Value, display_cell},
    frame::Frame,
};

pub const OUTPUT_DELIMITER: u8 = b',';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn parse_delimiter(value: &str) -> Result<u8> {
    match value {
        "tab" | "\\t" | "\t" => return Ok(b'\t'),
        "semicolon" => return Ok(b';'),
        "comma" => return Ok(b','),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() => Ok(ch as u8),
        _ => Err(anyhow!(
            "Delimiter must be a single ASCII character, got '{value}'"
        )),
    }
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

/// Reads a whole delimited file into a frame of text cells.
pub fn read_frame(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Frame> {
    let mut reader = open_csv_reader_from_path(path, delimiter)?;
    read_frame_from(&mut reader, encoding).with_context(|| format!("Reading {path:?}"))
}

pub fn read_frame_from<R>(reader: &mut csv::Reader<R>, encoding: &'static Encoding) -> Result<Frame>
where
    R: Read,
{
    let headers = reader_headers(reader, encoding).context("Reading headers")?;
    let mut frame = Frame::new(headers)?;
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        let row = decoded
            .into_iter()
            .map(|field| (!field.is_empty()).then_some(Value::String(field)))
            .collect();
        frame.push_row(row)?;
    }
    Ok(frame)
}

pub fn open_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    Ok(build_writer(BufWriter::new(file)))
}

fn build_writer<W: Write>(writer: W) -> csv::Writer<W> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(OUTPUT_DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    builder.from_writer(writer)
}

pub fn write_frame_to<W: Write>(writer: &mut csv::Writer<W>, frame: &Frame) -> Result<()> {
    writer
        .write_record(frame.headers())
        .context("Writing headers")?;
    for (row_idx, row) in frame.rows().iter().enumerate() {
        writer
            .write_record(row.iter().map(display_cell))
            .with_context(|| format!("Writing row {}", row_idx + 2))?;
    }
    writer.flush().context("Flushing output")?;
    Ok(())
}

pub fn write_frame(path: &Path, frame: &Frame) -> Result<()> {
    ensure!(
        frame.column_count() > 0,
        "Refusing to write {path:?}: frame has no columns"
    );
    let mut writer = open_csv_writer(path)?;
    write_frame_to(&mut writer, frame).with_context(|| format!("Writing {path:?}"))
}

/// Renders a frame as CSV text, mostly for previews and tests.
pub fn frame_to_csv_string(frame: &Frame) -> Result<String> {
    let mut writer = build_writer(Vec::new());
    write_frame_to(&mut writer, frame)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("Finishing CSV buffer: {}", err.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
