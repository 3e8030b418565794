use serde::Serialize;
use tabled::Tabled;

/// One scalar from the uploaded table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

/// The uploaded table as named columns, before any convention is applied.
///
/// Rows are positional against `columns`; a row shorter than the header is
/// treated as trailing `Empty` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        RawTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` for column index `col`, `Empty` when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

/// Canonical field names shared by every input convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Year,
    Month,
    Rain,
    Tavg,
    Tmin,
    Tmax,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Year,
        Field::Month,
        Field::Rain,
        Field::Tavg,
        Field::Tmin,
        Field::Tmax,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Year => "Year",
            Field::Month => "Month",
            Field::Rain => "Rain",
            Field::Tavg => "Tavg",
            Field::Tmin => "Tmin",
            Field::Tmax => "Tmax",
        }
    }
}

/// A normalized row whose values may still be null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    /// 1-based data row in the source table.
    pub row: usize,
    pub year: Option<i32>,
    pub month: Option<i64>,
    pub rain: Option<f64>,
    pub tavg: Option<f64>,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
}

impl PartialRecord {
    pub fn is_null(&self, field: Field) -> bool {
        match field {
            Field::Year => self.year.is_none(),
            Field::Month => self.month.is_none(),
            Field::Rain => self.rain.is_none(),
            Field::Tavg => self.tavg.is_none(),
            Field::Tmin => self.tmin.is_none(),
            Field::Tmax => self.tmax.is_none(),
        }
    }
}

/// One validated monthly observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub year: i32,
    pub month: u32,
    pub rain: f64,
    pub tavg: Option<f64>,
    pub tmin: f64,
    pub tmax: f64,
}

/// Long-run statistics for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub rain_mean: f64,
    /// Statistic chosen by `AggregationPolicy::tmax` (max by default).
    pub tmax: f64,
    pub tmin_mean: f64,
    pub tmin_min: f64,
}

/// Dataset-wide values, independent of month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StationExtremes {
    pub absolute_tmin: f64,
    pub absolute_tmax: f64,
    pub mean_annual_temp: f64,
    pub total_annual_rain: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub rain_total: f64,
    pub temp_mean: f64,
}

/// Free-text station metadata echoed into the R template.
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub name: String,
    pub elevation: String,
    pub period: Option<String>,
}

impl Default for StationInfo {
    fn default() -> Self {
        StationInfo {
            name: "StationName".to_string(),
            elevation: "Altitude".to_string(),
            period: None,
        }
    }
}

/// The 12-row monthly table, already formatted for display.
///
/// Headers are built at render time because the tmax column is named after
/// the statistic in use (`Tmax_max` or `Tmax_mean`).
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "RainTotal")]
    #[tabled(rename = "RainTotal")]
    pub rain_total: String,
    #[serde(rename = "TempMean")]
    #[tabled(rename = "TempMean")]
    pub temp_mean: String,
}

/// Inputs for an external Walter-Lieth plotter.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DiagramParams {
    pub station: String,
    pub elevation: String,
    pub period: Option<String>,
    pub tmax_statistic: String,
    pub months: Vec<u32>,
    pub precipitation: Vec<f64>,
    pub mean_monthly_tmax: Vec<f64>,
    pub mean_monthly_tmin: Vec<f64>,
    pub absolute_monthly_min_t: Vec<f64>,
    pub absolute_tmin: f64,
    pub absolute_tmax: f64,
}
