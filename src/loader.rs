use crate::error::{ClimateError, Result};
use crate::types::{Cell, RawTable};
use crate::util::{format_int, parse_cell};
use csv::ReaderBuilder;
use log::info;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions { delimiter: b',' }
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub columns: Vec<String>,
}

/// Read an uploaded table from disk. Files ending in `.json` are read as an
/// array of records, anything else as delimited text with a header row.
pub fn load_table(path: &Path, opts: &LoadOptions) -> Result<(RawTable, LoadReport)> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let table = if is_json {
        let text = std::fs::read_to_string(path)?;
        table_from_json(&text)?
    } else {
        let file = std::fs::File::open(path)?;
        table_from_csv(file, opts)?
    };

    let report = LoadReport {
        total_rows: table.rows.len(),
        columns: table.columns.clone(),
    };
    info!(
        "Loaded {} rows from {} ({} columns)",
        format_int(report.total_rows),
        path.display(),
        report.columns.len()
    );
    Ok((table, report))
}

pub fn table_from_csv<R: Read>(reader: R, opts: &LoadOptions) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .delimiter(opts.delimiter)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut table = RawTable::new(columns);
    for result in rdr.records() {
        let record = result?;
        table.rows.push(record.iter().map(parse_cell).collect());
    }
    // Blank rows after the last data row are spreadsheet padding. Blank rows
    // in between stay, so row numbers keep matching the file.
    while table
        .rows
        .last()
        .is_some_and(|row| row.iter().all(|c| matches!(c, Cell::Empty)))
    {
        table.rows.pop();
    }
    Ok(table)
}

pub fn table_from_json(text: &str) -> Result<RawTable> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(ClimateError::InvalidLayout(
            "expected a JSON array of records".to_string(),
        ));
    };

    let mut columns: Vec<String> = Vec::new();
    for item in &items {
        let Value::Object(map) = item else {
            return Err(ClimateError::InvalidLayout(
                "every JSON record must be an object".to_string(),
            ));
        };
        for key in map.keys() {
            let key = key.trim();
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }
    }

    let mut table = RawTable::new(columns);
    for item in &items {
        let Value::Object(map) = item else { continue };
        let row: Vec<Cell> = table
            .columns
            .iter()
            .map(|col| {
                let v = map
                    .iter()
                    .find(|(k, _)| k.trim() == col)
                    .map(|(_, v)| v);
                match v {
                    None | Some(Value::Null) => Cell::Empty,
                    Some(Value::Number(n)) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
                    Some(Value::String(s)) => parse_cell(s),
                    Some(other) => Cell::Text(other.to_string()),
                }
            })
            .collect();
        table.rows.push(row);
    }
    Ok(table)
}
