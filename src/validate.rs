//! Completeness checks between normalization and aggregation.

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};

use crate::error::{BadMonth, ClimateError, NullCell, Result, YearGap};
use crate::schema::NormalizedTable;
use crate::types::{CanonicalRecord, Field};
use crate::util::format_int;

/// Validated records plus the non-fatal findings.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub records: Vec<CanonicalRecord>,
    pub warnings: Vec<String>,
}

/// Run the four checks in order and convert to typed records.
///
/// 1. every required column exists,
/// 2. no cell of a required or present column is blank,
/// 3. every month is within 1..=12,
/// 4. every year holds exactly the 12 months once each.
///
/// Each check reports all of its offenders before the pipeline stops.
pub fn validate(table: &NormalizedTable) -> Result<ValidationReport> {
    let required = table.convention.required_fields();
    check_columns(table)?;

    if table.rows.is_empty() {
        return Err(ClimateError::NoData);
    }

    // Optional columns that exist must be filled on every row too.
    let checked: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| required.contains(f) || table.present.contains(f))
        .collect();
    let mut nulls: Vec<NullCell> = Vec::new();
    for rec in &table.rows {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for field in &checked {
            let column = table.source_name(*field);
            if rec.is_null(*field) && seen.insert(column) {
                nulls.push(NullCell {
                    column: column.to_string(),
                    row: rec.row,
                });
            }
        }
    }
    if !nulls.is_empty() {
        return Err(ClimateError::MissingValues { cells: nulls });
    }

    let bad_months: Vec<BadMonth> = table
        .rows
        .iter()
        .filter_map(|r| {
            let month = r.month?;
            (!(1..=12).contains(&month)).then_some(BadMonth { row: r.row, month })
        })
        .collect();
    if !bad_months.is_empty() {
        return Err(ClimateError::MonthOutOfRange { rows: bad_months });
    }

    // Nulls and range are already excluded, so every field below is Some.
    let mut records = Vec::with_capacity(table.rows.len());
    for r in &table.rows {
        if let (Some(year), Some(month), Some(rain), Some(tmin), Some(tmax)) =
            (r.year, r.month, r.rain, r.tmin, r.tmax)
        {
            records.push(CanonicalRecord {
                year,
                month: month as u32,
                rain,
                tavg: r.tavg,
                tmin,
                tmax,
            });
        }
    }

    let gaps = incomplete_years(&records);
    if !gaps.is_empty() {
        return Err(ClimateError::IncompleteYear { years: gaps });
    }

    let warnings = plausibility_warnings(&records);
    for w in &warnings {
        warn!("{}", w);
    }

    info!(
        "Validated {} records covering {} complete year(s)",
        format_int(records.len()),
        format_int(records.len() / 12)
    );

    Ok(ValidationReport { records, warnings })
}

/// Fail with `MissingColumns` when a required source column is absent.
///
/// Only looks at the header, so it can run before any cell is coerced.
pub fn check_columns(table: &NormalizedTable) -> Result<()> {
    let missing: Vec<String> = table
        .convention
        .required_fields()
        .iter()
        .filter(|f| !table.present.contains(f))
        .map(|f| table.source_name(*f).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ClimateError::MissingColumns { names: missing })
    }
}

/// Years that do not hold months 1..=12 exactly once, ascending by year.
pub fn incomplete_years(records: &[CanonicalRecord]) -> Vec<YearGap> {
    let mut by_year: BTreeMap<i32, (BTreeSet<u32>, usize)> = BTreeMap::new();
    for r in records {
        let e = by_year.entry(r.year).or_default();
        e.0.insert(r.month);
        e.1 += 1;
    }
    by_year
        .into_iter()
        .filter(|(_, (months, rows))| months.len() != 12 || *rows != 12)
        .map(|(year, (months, rows))| YearGap {
            year,
            distinct_months: months.len(),
            rows,
        })
        .collect()
}

fn plausibility_warnings(records: &[CanonicalRecord]) -> Vec<String> {
    let mut out = Vec::new();
    let inverted = records.iter().filter(|r| r.tmin > r.tmax).count();
    if inverted > 0 {
        out.push(format!(
            "{} record(s) have Tmin greater than Tmax",
            format_int(inverted)
        ));
    }
    let negative_rain = records.iter().filter(|r| r.rain < 0.0).count();
    if negative_rain > 0 {
        out.push(format!(
            "{} record(s) have negative precipitation",
            format_int(negative_rain)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::normalize;
    use crate::types::{Cell, RawTable};

    fn year_rows(year: f64, months: &[u32]) -> Vec<Vec<Cell>> {
        months
            .iter()
            .map(|m| {
                vec![
                    Cell::Number(year),
                    Cell::Number(*m as f64),
                    Cell::Number(10.0),
                    Cell::Number(5.0),
                    Cell::Number(0.0),
                    Cell::Number(10.0),
                ]
            })
            .collect()
    }

    fn table(rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable {
            columns: ["Year", "Month", "Rain", "Tavg", "Tmin", "Tmax"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows,
        }
    }

    fn run(t: &RawTable) -> Result<ValidationReport> {
        validate(&normalize(t)?)
    }

    #[test]
    fn accepts_complete_years_out_of_order() {
        let mut rows = year_rows(2015.0, &[12, 1, 11, 2, 10, 3, 9, 4, 8, 5, 7, 6]);
        rows.extend(year_rows(2014.0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]));
        let report = run(&table(rows)).unwrap();
        assert_eq!(report.records.len(), 24);
        let years: BTreeSet<i32> = report.records.iter().map(|r| r.year).collect();
        assert_eq!(years.into_iter().collect::<Vec<_>>(), vec![2014, 2015]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn rejects_year_with_eleven_months() {
        let mut rows = year_rows(2014.0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        rows.extend(year_rows(2015.0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]));
        match run(&table(rows)) {
            Err(ClimateError::IncompleteYear { years }) => {
                assert_eq!(
                    years,
                    vec![YearGap { year: 2015, distinct_months: 11, rows: 11 }]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn reports_every_incomplete_year() {
        let mut rows = year_rows(2013.0, &[1, 2, 3]);
        rows.extend(year_rows(2014.0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]));
        rows.extend(year_rows(2016.0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 12]));
        match run(&table(rows)) {
            Err(ClimateError::IncompleteYear { years }) => {
                let ids: Vec<i32> = years.iter().map(|g| g.year).collect();
                assert_eq!(ids, vec![2013, 2016]);
                assert_eq!(years[1].distinct_months, 12);
                assert_eq!(years[1].rows, 13);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_columns_are_named() {
        let t = RawTable {
            columns: vec!["Year".into(), "Month".into(), "Rain".into()],
            rows: vec![],
        };
        match run(&t) {
            Err(ClimateError::MissingColumns { names }) => {
                assert_eq!(names, vec!["Tavg", "Tmin", "Tmax"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn agency_missing_value_columns_use_agency_names() {
        let t = RawTable {
            columns: vec!["Time".into(), "rau".into()],
            rows: vec![],
        };
        match run(&t) {
            Err(ClimateError::MissingColumns { names }) => {
                assert_eq!(names, vec!["tn", "tx"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn blank_cells_are_missing_values() {
        let mut rows = year_rows(2014.0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        rows[4][2] = Cell::Empty;
        rows[7].truncate(5);
        match run(&table(rows)) {
            Err(ClimateError::MissingValues { cells }) => {
                assert_eq!(
                    cells,
                    vec![
                        NullCell { column: "Rain".into(), row: 5 },
                        NullCell { column: "Tmax".into(), row: 8 },
                    ]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn blank_optional_tavg_is_a_missing_value() {
        let mut rows: Vec<Vec<Cell>> = (1..=12)
            .map(|m| {
                vec![
                    Cell::Number(201400.0 + m as f64),
                    Cell::Number(10.0),
                    Cell::Number(100.0),
                    Cell::Number(0.0),
                    Cell::Number(10.0),
                ]
            })
            .collect();
        rows[0][2] = Cell::Empty;
        let t = RawTable {
            columns: ["YearMonth", "Rain", "Tavg", "Tmin", "Tmax"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows,
        };
        match run(&t) {
            Err(ClimateError::MissingValues { cells }) => {
                assert_eq!(cells, vec![NullCell { column: "Tavg".into(), row: 1 }]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn month_thirteen_is_out_of_range() {
        let mut rows = year_rows(2014.0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        rows[11][1] = Cell::Number(13.0);
        match run(&table(rows)) {
            Err(ClimateError::MonthOutOfRange { rows }) => {
                assert_eq!(rows, vec![BadMonth { row: 12, month: 13 }]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_table_has_no_data() {
        assert!(matches!(run(&table(vec![])), Err(ClimateError::NoData)));
    }

    #[test]
    fn inverted_temperatures_only_warn() {
        let mut rows = year_rows(2014.0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        rows[0][4] = Cell::Number(20.0);
        let report = run(&table(rows)).unwrap();
        assert_eq!(report.warnings, vec!["1 record(s) have Tmin greater than Tmax"]);
    }
}
