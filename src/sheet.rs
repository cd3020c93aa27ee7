use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A loosely-typed spreadsheet cell as produced by the loader.
///
/// Coercions are best-effort and return `None` for unusable cells. Each
/// consumer applies its own fill policy.
///
/// JSON serialization is untagged. A `Text` cell whose content is an ISO
/// date deserializes back as `Date`, so raw rows are not a lossless JSON
/// round trip; the typed records are unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
}

/// A single spreadsheet row, keyed by column header.
pub type SheetRow = BTreeMap<String, CellValue>;

/// A whole workbook: sheet name to rows, as handed over by the loader.
pub type RawSheetSet = BTreeMap<String, Vec<SheetRow>>;

/// Excel serial day 0 is 1899-12-30 (the 1900 leap-year bug is baked into
/// the epoch offset).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial values above this are not plausible dates (year ~2100) and are
/// treated as plain numbers.
const MAX_EXCEL_SERIAL: f64 = 75_000.0;

impl CellValue {
    pub fn from_text(raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    /// Best-effort numeric coercion. Booleans count as 1/0, text is parsed
    /// after trimming, everything else is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Best-effort date coercion: date cells pass through, text is tried
    /// against the formats the source data actually uses (ISO first, then
    /// month-first, then day-first), and plausible numbers are read as
    /// Excel serial days.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Text(s) => parse_date_text(s.trim()),
            CellValue::Number(n) => date_from_excel_serial(*n),
            _ => None,
        }
    }

    /// Textual view of the cell, `None` for empty cells. Numbers and dates
    /// stringify so free-text fields (currency labels, item codes entered
    /// as numbers) survive the round trip through the loader.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Timestamps like "2024-03-05 00:00:00" keep just the date part.
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

fn date_from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(chrono::Days::new(serial as u64))
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
