/// Error types for the climate data pipeline
use thiserror::Error;

/// A year that failed the complete-year check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGap {
    pub year: i32,
    pub distinct_months: usize,
    pub rows: usize,
}

/// A required cell that was blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullCell {
    pub column: String,
    pub row: usize,
}

/// A month value outside 1..=12, with its 1-based data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadMonth {
    pub row: usize,
    pub month: i64,
}

/// Main error type for the climate pipeline.
///
/// Every variant aborts the whole run; nothing is rendered for a table that
/// produced one of these.
#[derive(Error, Debug)]
pub enum ClimateError {
    /// No supported column convention matched the header
    #[error("Unrecognized input format (columns: {}). Expected Year/Month, YearMonth or Time, or the agency columns Time/rau/tn/tx", .columns.join(", "))]
    UnrecognizedSchema { columns: Vec<String> },

    /// Convention matched but value columns are absent
    #[error("Missing required columns: {}", .names.join(", "))]
    MissingColumns { names: Vec<String> },

    /// Blank cells in required columns
    #[error("Missing values in {} cell(s): {}", .cells.len(), describe_cells(.cells))]
    MissingValues { cells: Vec<NullCell> },

    /// Month outside 1..=12
    #[error("Month out of range (1-12): {}", describe_months(.rows))]
    MonthOutOfRange { rows: Vec<BadMonth> },

    /// One or more years do not hold exactly the 12 months
    #[error("Incomplete years (each year needs exactly 12 distinct months): {}", describe_years(.years))]
    IncompleteYear { years: Vec<YearGap> },

    /// A cell could not be read as a number
    #[error("Non-numeric value {value:?} in column {column} (row {row})")]
    NonNumericField {
        column: String,
        row: usize,
        value: String,
    },

    /// The table has no data rows
    #[error("The input table contains no data rows")]
    NoData,

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Input file has a shape the loader cannot turn into a table
    #[error("Invalid input layout: {0}")]
    InvalidLayout(String),
}

/// Type alias for Results using ClimateError
pub type Result<T> = std::result::Result<T, ClimateError>;

// Long lists are cut so a single message stays readable.
const MAX_LISTED: usize = 10;

fn truncated<T>(items: &[T], fmt: impl Fn(&T) -> String) -> String {
    let mut parts: Vec<String> = items.iter().take(MAX_LISTED).map(fmt).collect();
    if items.len() > MAX_LISTED {
        parts.push(format!("... and {} more", items.len() - MAX_LISTED));
    }
    parts.join(", ")
}

fn describe_cells(cells: &[NullCell]) -> String {
    truncated(cells, |c| format!("{} row {}", c.column, c.row))
}

fn describe_months(rows: &[BadMonth]) -> String {
    truncated(rows, |b| format!("row {} has month {}", b.row, b.month))
}

fn describe_years(years: &[YearGap]) -> String {
    // Every offending year is named.
    years
        .iter()
        .map(|g| {
            format!(
                "{} ({} distinct months in {} rows)",
                g.year, g.distinct_months, g.rows
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
