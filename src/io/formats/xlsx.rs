//! XLSX format adapter for import/export.
//!
//! Reads the first worksheet with `calamine` and writes a single worksheet
//! with `rust_xlsxwriter`. Row 1 holds the header; every following row holds
//! one record. Cells keep their native type in both directions.
//!
//! Empty text is stored as a blank cell and reads back as null; re-typing the
//! field as text restores the empty string.

use super::codec_error;
use crate::io::traits::{ExportSink, Header, ImportSource};
use crate::models::Record;
use crate::{Error, Result};
use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde_json::{Number, Value};
use std::collections::VecDeque;
use std::io::{BufRead, Seek, Write};

/// XLSX import source.
///
/// The workbook is decoded when the source is created; records are then
/// yielded in row order. Blank rows are skipped, as are columns with a blank
/// header cell.
pub struct XlsxImportSource {
    records: VecDeque<Record>,
}

impl XlsxImportSource {
    /// Creates a new XLSX import source.
    ///
    /// # Errors
    ///
    /// Returns an error if the workbook cannot be decoded or has no worksheet.
    pub fn new<R: BufRead + Seek>(reader: R) -> Result<Self> {
        let mut workbook: Xlsx<R> =
            Xlsx::new(reader).map_err(|e| codec_error("open_xlsx", e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::InvalidInput("Workbook has no worksheets".to_string()))?
            .map_err(|e| codec_error("read_xlsx", e))?;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|cells| cells.iter().map(header_text).collect())
            .unwrap_or_default();

        let records = rows
            .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
            .map(|cells| {
                header
                    .iter()
                    .enumerate()
                    .filter(|(_, name)| !name.is_empty())
                    .map(|(i, name)| {
                        let value = cells.get(i).map_or(Value::Null, cell_value);
                        (name.clone(), value)
                    })
                    .collect::<Record>()
            })
            .collect();

        Ok(Self { records })
    }
}

impl ImportSource for XlsxImportSource {
    fn next(&mut self) -> Result<Option<Record>> {
        Ok(self.records.pop_front())
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.records.len())
    }
}

/// Converts a header cell to a field name.
fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

/// Converts a data cell to a value of the same kind.
///
/// Spreadsheets store every number as a float; integral floats come back as
/// integers so ids and ages survive a round trip unchanged.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => number_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => number_value(dt.as_f64()),
        Data::Error(e) => Value::String(e.to_string()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

/// XLSX export sink.
///
/// Cells are collected into a worksheet and the workbook is encoded into the
/// writer on [`finalize`](ExportSink::finalize).
pub struct XlsxExportSink<W: Write> {
    writer: W,
    worksheet: Worksheet,
    header: Option<Header>,
}

impl<W: Write> XlsxExportSink<W> {
    /// Creates a new XLSX export sink.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            worksheet: Worksheet::new(),
            header: None,
        }
    }
}

impl<W: Write> ExportSink for XlsxExportSink<W> {
    fn begin(&mut self, header: &Header) -> Result<()> {
        for (col, name) in header.columns().iter().enumerate() {
            self.worksheet
                .write_string(0, column_index(col)?, name)
                .map_err(|e| codec_error("write_xlsx_headers", e))?;
        }
        self.header = Some(header.clone());
        Ok(())
    }

    fn write(&mut self, row: usize, record: &Record) -> Result<()> {
        let Some(header) = &self.header else {
            return Err(codec_error("write_xlsx", "header not written"));
        };
        let values = header.align(row, record)?;
        // Row 0 holds the header.
        let sheet_row = u32::try_from(row + 1)
            .map_err(|_| codec_error("write_xlsx", "too many rows for a worksheet"))?;

        for (col, value) in values.into_iter().enumerate() {
            write_cell(&mut self.worksheet, sheet_row, column_index(col)?, value)
                .map_err(|e| codec_error("write_xlsx", e))?;
        }
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<()> {
        let Self {
            mut writer,
            worksheet,
            ..
        } = *self;

        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);
        let bytes = workbook
            .save_to_buffer()
            .map_err(|e| codec_error("encode_xlsx", e))?;

        writer
            .write_all(&bytes)
            .map_err(|e| codec_error("write_xlsx", e))?;
        writer
            .flush()
            .map_err(|e| codec_error("flush_xlsx", e))
    }
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| codec_error("write_xlsx", "too many columns for a worksheet"))
}

/// Writes one value as a typed cell. Nulls leave the cell blank.
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> std::result::Result<(), XlsxError> {
    match value {
        Value::Null => {},
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        },
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                worksheet.write_number(row, col, f)?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, s)?;
        },
        Value::Array(_) | Value::Object(_) => {
            worksheet.write_string(row, col, value.to_string())?;
        },
    }
    Ok(())
}
