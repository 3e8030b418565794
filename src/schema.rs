//! Input convention detection and normalization to the canonical schema.
//!
//! Uploaded tables come in a few column layouts. Each layout is a
//! [`Convention`] with a structural predicate over the header and a mapping
//! of its columns onto canonical [`Field`]s. Conventions are tried in the
//! order of [`Convention::ALL`]; the first match wins.

use std::collections::BTreeSet;
use std::fmt;

use log::debug;

use crate::error::{ClimateError, Result};
use crate::types::{Cell, Field, PartialRecord, RawTable};
use crate::util::as_integer;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// `Time` (YYYYMM) with `rau`, `tn`, `tx`.
    Agency,
    /// Literal `Year` and `Month` columns.
    SeparateYearMonth,
    /// One YYYYMM code in `YearMonth` or `Time`.
    CombinedCode,
}

/// Where a convention reads the year and month from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateSource {
    Split { year: &'static str, month: &'static str },
    Code(&'static str),
}

impl Convention {
    /// Precedence order used by [`detect`].
    pub const ALL: [Convention; 3] = [
        Convention::Agency,
        Convention::SeparateYearMonth,
        Convention::CombinedCode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Convention::Agency => "agency (Time/rau/tn/tx)",
            Convention::SeparateYearMonth => "separate Year/Month",
            Convention::CombinedCode => "combined YearMonth code",
        }
    }

    /// Structural match on the header alone.
    pub fn matches(self, table: &RawTable) -> bool {
        match self {
            Convention::Agency => {
                table.has_column("Time")
                    && ["rau", "tn", "tx"].iter().any(|c| table.has_column(c))
            }
            Convention::SeparateYearMonth => {
                table.has_column("Year") && table.has_column("Month")
            }
            Convention::CombinedCode => {
                table.has_column("YearMonth") || table.has_column("Time")
            }
        }
    }

    /// Canonical fields that must be present and non-null for this layout.
    pub fn required_fields(self) -> &'static [Field] {
        match self {
            Convention::Agency | Convention::CombinedCode => &[
                Field::Year,
                Field::Month,
                Field::Rain,
                Field::Tmin,
                Field::Tmax,
            ],
            Convention::SeparateYearMonth => &[
                Field::Year,
                Field::Month,
                Field::Rain,
                Field::Tavg,
                Field::Tmin,
                Field::Tmax,
            ],
        }
    }

    /// Source column name for a value field, `None` when the layout has no
    /// such column at all.
    pub fn value_column(self, field: Field) -> Option<&'static str> {
        match (self, field) {
            (Convention::Agency, Field::Rain) => Some("rau"),
            (Convention::Agency, Field::Tmin) => Some("tn"),
            (Convention::Agency, Field::Tmax) => Some("tx"),
            (Convention::Agency, Field::Tavg) => None,
            (_, Field::Rain) => Some("Rain"),
            (_, Field::Tavg) => Some("Tavg"),
            (_, Field::Tmin) => Some("Tmin"),
            (_, Field::Tmax) => Some("Tmax"),
            (_, Field::Year) | (_, Field::Month) => None,
        }
    }

    fn date_source(self, table: &RawTable) -> DateSource {
        match self {
            Convention::Agency => DateSource::Code("Time"),
            Convention::SeparateYearMonth => DateSource::Split {
                year: "Year",
                month: "Month",
            },
            Convention::CombinedCode => {
                if table.has_column("YearMonth") {
                    DateSource::Code("YearMonth")
                } else {
                    DateSource::Code("Time")
                }
            }
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of [`normalize`]: rows in canonical shape, nulls still allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub convention: Convention,
    /// Canonical fields whose source column exists in the upload.
    pub present: BTreeSet<Field>,
    /// Source columns for year and month (the same column for YYYYMM codes).
    pub date_columns: (&'static str, &'static str),
    pub rows: Vec<PartialRecord>,
}

impl NormalizedTable {
    /// Source column name a canonical field was read from, for messages.
    pub fn source_name(&self, field: Field) -> &'static str {
        match field {
            Field::Year => self.date_columns.0,
            Field::Month => self.date_columns.1,
            _ => self.convention.value_column(field).unwrap_or(field.name()),
        }
    }
}

/// Pick the first convention whose predicate holds.
pub fn detect(table: &RawTable) -> Result<Convention> {
    Convention::ALL
        .iter()
        .copied()
        .find(|c| c.matches(table))
        .ok_or_else(|| ClimateError::UnrecognizedSchema {
            columns: table.columns.clone(),
        })
}

/// Detect the convention and rewrite every row into canonical fields.
///
/// A missing required column fails with `MissingColumns` before any cell is
/// read. Blank cells stay `None` for the validator to report. Text that is
/// not a number fails with `NonNumericField`. The input is not
/// modified.
pub fn normalize(table: &RawTable) -> Result<NormalizedTable> {
    let convention = detect(table)?;
    debug!(
        "Detected {} input format from columns [{}]",
        convention,
        table.columns.join(", ")
    );

    let dates = convention.date_source(table);
    let date_columns = match dates {
        DateSource::Split { year, month } => (year, month),
        DateSource::Code(column) => (column, column),
    };
    let mut present = BTreeSet::new();
    present.insert(Field::Year);
    present.insert(Field::Month);

    let value_cols: Vec<(Field, Option<usize>, &'static str)> =
        [Field::Rain, Field::Tavg, Field::Tmin, Field::Tmax]
            .into_iter()
            .filter_map(|f| convention.value_column(f).map(|name| (f, name)))
            .map(|(f, name)| (f, table.column_index(name), name))
            .collect();
    for (field, idx, _) in &value_cols {
        if idx.is_some() {
            present.insert(*field);
        }
    }

    let mut normalized = NormalizedTable {
        convention,
        present,
        date_columns,
        rows: Vec::with_capacity(table.rows.len()),
    };
    validate::check_columns(&normalized)?;

    for i in 0..table.rows.len() {
        let row_no = i + 1;
        let mut rec = PartialRecord {
            row: row_no,
            ..Default::default()
        };

        match dates {
            DateSource::Split { year, month } => {
                rec.year = read_integer(table, i, year)?
                    .map(|y| to_year(y, year, row_no))
                    .transpose()?;
                rec.month = read_integer(table, i, month)?;
            }
            DateSource::Code(column) => {
                if let Some(code) = read_integer(table, i, column)? {
                    rec.year = Some(to_year(code.div_euclid(100), column, row_no)?);
                    rec.month = Some(code.rem_euclid(100));
                }
            }
        }

        for (field, idx, name) in &value_cols {
            let Some(idx) = idx else { continue };
            let value = read_number(table.cell(i, *idx), name, row_no)?;
            match field {
                Field::Rain => rec.rain = value,
                Field::Tavg => rec.tavg = value,
                Field::Tmin => rec.tmin = value,
                Field::Tmax => rec.tmax = value,
                Field::Year | Field::Month => {}
            }
        }
        normalized.rows.push(rec);
    }

    Ok(normalized)
}

fn read_number(cell: &Cell, column: &str, row: usize) -> Result<Option<f64>> {
    match cell {
        Cell::Number(v) => Ok(Some(*v)),
        Cell::Empty => Ok(None),
        Cell::Text(s) => Err(ClimateError::NonNumericField {
            column: column.to_string(),
            row,
            value: s.clone(),
        }),
    }
}

fn read_integer(table: &RawTable, row: usize, column: &str) -> Result<Option<i64>> {
    let Some(idx) = table.column_index(column) else {
        return Ok(None);
    };
    let cell = table.cell(row, idx);
    match read_number(cell, column, row + 1)? {
        None => Ok(None),
        Some(v) => as_integer(v)
            .map(Some)
            .ok_or_else(|| ClimateError::NonNumericField {
                column: column.to_string(),
                row: row + 1,
                value: v.to_string(),
            }),
    }
}

fn to_year(v: i64, column: &str, row: usize) -> Result<i32> {
    i32::try_from(v).map_err(|_| ClimateError::NonNumericField {
        column: column.to_string(),
        row,
        value: v.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    #[test]
    fn agency_format_normalizes_time_code() {
        let t = table(
            &["Time", "rau", "tn", "tx"],
            vec![vec![n(201401.0), n(36.9), n(-7.4), n(13.8)]],
        );
        let norm = normalize(&t).unwrap();
        assert_eq!(norm.convention, Convention::Agency);
        let r = &norm.rows[0];
        assert_eq!(r.year, Some(2014));
        assert_eq!(r.month, Some(1));
        assert_eq!(r.rain, Some(36.9));
        assert_eq!(r.tmin, Some(-7.4));
        assert_eq!(r.tmax, Some(13.8));
        assert_eq!(r.tavg, None);
        assert!(!norm.present.contains(&Field::Tavg));
    }

    #[test]
    fn agency_takes_precedence_over_year_month() {
        let t = table(&["Year", "Month", "Time", "rau"], vec![]);
        assert_eq!(detect(&t).unwrap(), Convention::Agency);
    }

    #[test]
    fn separate_year_month_wins_over_combined_code() {
        let t = table(&["YearMonth", "Year", "Month", "Rain"], vec![]);
        assert_eq!(detect(&t).unwrap(), Convention::SeparateYearMonth);
    }

    #[test]
    fn time_without_agency_columns_is_a_combined_code() {
        let t = table(&["Time", "Rain", "Tmin", "Tmax"], vec![]);
        assert_eq!(detect(&t).unwrap(), Convention::CombinedCode);
    }

    #[test]
    fn combined_code_splits_month_thirteen() {
        let t = table(
            &["YearMonth", "Rain", "Tmin", "Tmax"],
            vec![vec![n(201413.0), n(1.0), n(0.0), n(5.0)]],
        );
        let norm = normalize(&t).unwrap();
        assert_eq!(norm.rows[0].year, Some(2014));
        assert_eq!(norm.rows[0].month, Some(13));
    }

    #[test]
    fn unknown_header_is_rejected() {
        let t = table(&["Date", "Precip"], vec![]);
        match detect(&t) {
            Err(ClimateError::UnrecognizedSchema { columns }) => {
                assert_eq!(columns, vec!["Date", "Precip"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn text_in_value_column_is_non_numeric() {
        let t = table(
            &["Year", "Month", "Rain", "Tavg", "Tmin", "Tmax"],
            vec![vec![
                n(2014.0),
                n(1.0),
                Cell::Text("trace".to_string()),
                n(2.7),
                n(-7.4),
                n(13.8),
            ]],
        );
        match normalize(&t) {
            Err(ClimateError::NonNumericField { column, row, value }) => {
                assert_eq!(column, "Rain");
                assert_eq!(row, 1);
                assert_eq!(value, "trace");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn fractional_month_is_non_numeric() {
        let t = table(
            &["Year", "Month", "Rain", "Tmin", "Tmax"],
            vec![vec![n(2014.0), n(1.5), n(1.0), n(0.0), n(5.0)]],
        );
        assert!(matches!(
            normalize(&t),
            Err(ClimateError::NonNumericField { .. })
        ));
    }

    #[test]
    fn blanks_stay_null() {
        let t = table(
            &["YearMonth", "Rain", "Tmin", "Tmax"],
            vec![vec![n(201401.0), Cell::Empty, n(0.0)]],
        );
        let norm = normalize(&t).unwrap();
        assert_eq!(norm.rows[0].month, Some(1));
        assert_eq!(norm.rows[0].rain, None);
        assert_eq!(norm.rows[0].tmax, None);
        assert!(norm.present.contains(&Field::Rain));
        assert!(!norm.present.contains(&Field::Tavg));
    }

    #[test]
    fn missing_column_is_reported_before_bad_text() {
        let t = table(
            &["Year", "Month", "Rain"],
            vec![vec![n(2014.0), n(1.0), Cell::Text("trace".to_string())]],
        );
        match normalize(&t) {
            Err(ClimateError::MissingColumns { names }) => {
                assert_eq!(names, vec!["Tavg", "Tmin", "Tmax"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
