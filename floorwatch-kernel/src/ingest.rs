//! Record ingestion: raw text in, uniform records out.
//!
//! Two sources exist and are never reconciled:
//! - the machines API, a JSON array of camelCase objects with text fields
//! - CSV text with a header row, keyed by the header names verbatim
//!
//! Nothing here retries or caches. A field that fails to parse becomes
//! missing; only a malformed payload fails the whole ingestion.

use crate::error::IngestError;
use crate::models::{MachineRecord, RawMachine};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Parse a `GET /machines` payload. The top level must be an array of objects.
pub fn parse_machines_json(text: &str) -> Result<Vec<MachineRecord>, IngestError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(entries) = value else {
        return Err(IngestError::Shape(format!(
            "expected an array of machines, got {}",
            kind_of(&value)
        )));
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            return Err(IngestError::Shape(format!(
                "entry {index} is {}, expected an object",
                kind_of(&entry)
            )));
        }
        let raw: RawMachine = serde_json::from_value(entry)?;
        records.push(MachineRecord::from(raw));
    }

    let inconsistent = records.iter().filter(|r| !r.flags_consistent()).count();
    debug!(records = records.len(), inconsistent, "ingested machines payload");
    Ok(records)
}

/// Parse a `GET /machines/{id}` payload (a single object).
pub fn parse_machine_json(text: &str) -> Result<MachineRecord, IngestError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(IngestError::Shape(format!(
            "expected a machine object, got {}",
            kind_of(&value)
        )));
    }
    let raw: RawMachine = serde_json::from_value(value)?;
    Ok(MachineRecord::from(raw))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One CSV data row keyed by header name, exactly as written in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    cells: HashMap<String, String>,
}

impl CsvRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, String)> for CsvRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        CsvRow {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Parse CSV data with a header row.
///
/// Short rows get empty cells for the missing columns, extra cells are
/// dropped, and rows made only of empty cells are skipped. Cells that are
/// not valid UTF-8 are decoded lossily, so they only spoil their own value.
pub fn parse_csv_rows<D: AsRef<[u8]>>(data: D) -> Result<Vec<CsvRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_ref());

    let headers: Vec<String> = reader.byte_headers()?.iter().map(lossy).collect();
    let mut rows = Vec::new();

    for record in reader.byte_records() {
        let record = record?;
        let cells: Vec<String> = record.iter().map(lossy).collect();
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), cells.get(i).cloned().unwrap_or_default()))
            .collect();
        rows.push(row);
    }

    debug!(rows = rows.len(), columns = headers.len(), "parsed csv data");
    Ok(rows)
}

fn lossy(cell: &[u8]) -> String {
    String::from_utf8_lossy(cell).into_owned()
}
