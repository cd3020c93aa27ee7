//! Spreadsheet ingestion: turns an `.xlsx` workbook (or a single-sheet CSV
//! export) into a [`RawSheetSet`] for the cleaners. This is the only part of
//! the crate that can fail; once a `RawSheetSet` exists, the pipeline is
//! infallible.

use crate::error::Result;
use crate::sheet::{CellValue, RawSheetSet, SheetRow};
use calamine::{open_workbook_auto, Data, Reader};
use log::debug;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Reads every sheet of a workbook. The first row of each sheet is the
/// header row; data rows become [`SheetRow`]s keyed by header.
pub fn load_workbook<P: AsRef<Path>>(path: P) -> Result<RawSheetSet> {
    let mut workbook = open_workbook_auto(path.as_ref())?;
    let names = workbook.sheet_names().to_owned();

    let mut sheets = RawSheetSet::new();
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let mut rows = range.rows();

        let headers = match rows.next() {
            Some(header_row) => dedup_headers(header_row.iter().map(header_text)),
            None => Vec::new(),
        };

        let data: Vec<SheetRow> = rows.map(|cells| build_row(&headers, cells)).collect();
        debug!("Loaded sheet '{}': {} rows", name, data.len());
        sheets.insert(name, data);
    }
    Ok(sheets)
}

/// Reads a single sheet from a CSV export. Every cell comes through as text;
/// the cleaners handle the numeric and date coercion.
pub fn read_csv_sheet<R: Read>(reader: R) -> Result<Vec<SheetRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = dedup_headers(csv_reader.headers()?.iter().map(str::to_string));

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let mut row = SheetRow::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            let value = CellValue::from_text(field);
            if value != CellValue::Empty {
                row.insert(header.clone(), value);
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Repeated headers get a numeric suffix, the same way pandas disambiguates
/// them: `Monto`, `Monto.1`, `Monto.2`. The expense sheet relies on this:
/// its second `Monto` column is addressed as `Monto.1` downstream.
fn dedup_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.map(|name| {
        let count = seen.entry(name.clone()).or_insert(0);
        let header = if *count == 0 {
            name
        } else {
            format!("{}.{}", name, count)
        };
        *count += 1;
        header
    })
    .collect()
}

fn build_row(headers: &[String], cells: &[Data]) -> SheetRow {
    let mut row = SheetRow::new();
    for (header, cell) in headers.iter().zip(cells.iter()) {
        if header.is_empty() {
            continue;
        }
        let value = cell_value(cell);
        if value != CellValue::Empty {
            row.insert(header.clone(), value);
        }
    }
    row
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::from_text(s),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| CellValue::Date(ndt.date()))
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string().trim().to_string(),
    }
}
