//! Report rendering: display tables, the climatol R block, and the
//! parameters for an external diagram.
//!
//! Nothing here can fail; any `ClimateSummary` produced by the aggregator
//! renders.

use crate::aggregate::ClimateSummary;
use crate::types::{DiagramParams, MonthlySummary, StationInfo, SummaryTable, YearRow};
use crate::util::{format_number, format_one_decimal};

/// First line of the R block.
pub const TOOL_PREFIX: &str = "library(climatol)";
/// R function that draws the Walter-Lieth diagram.
pub const DIAGRAM_CALL: &str = "diagwl";

/// The 12-row monthly table for display, with thousands separators.
pub fn summary_table(summary: &ClimateSummary) -> SummaryTable {
    monthly_table(summary, display_number)
}

/// The same table with plain one-decimal numbers, for CSV export.
pub fn summary_export_table(summary: &ClimateSummary) -> SummaryTable {
    monthly_table(summary, format_one_decimal)
}

fn display_number(v: f64) -> String {
    format_number(v, 1)
}

fn monthly_table(summary: &ClimateSummary, fmt: fn(f64) -> String) -> SummaryTable {
    let headers = vec![
        "Month".to_string(),
        "Rain_mean".to_string(),
        summary.policy.tmax_label(),
        "Tmin_mean".to_string(),
        "Tmin_min".to_string(),
    ];
    let rows = summary
        .months
        .iter()
        .map(|m| {
            vec![
                m.month.to_string(),
                fmt(m.rain_mean),
                fmt(m.tmax),
                fmt(m.tmin_mean),
                fmt(m.tmin_min),
            ]
        })
        .collect();
    SummaryTable { headers, rows }
}

pub fn year_rows(summary: &ClimateSummary) -> Vec<YearRow> {
    yearly_rows(summary, display_number)
}

pub fn year_export_rows(summary: &ClimateSummary) -> Vec<YearRow> {
    yearly_rows(summary, format_one_decimal)
}

fn yearly_rows(summary: &ClimateSummary, fmt: fn(f64) -> String) -> Vec<YearRow> {
    summary
        .years
        .iter()
        .map(|y| YearRow {
            year: y.year,
            rain_total: fmt(y.rain_total),
            temp_mean: fmt(y.temp_mean),
        })
        .collect()
}

/// Station-level lines shown under the monthly table.
pub fn extremes_lines(summary: &ClimateSummary) -> Vec<String> {
    let e = &summary.extremes;
    vec![
        format!("Absolute minimum temperature (°C): {:.1}", e.absolute_tmin),
        format!("Absolute maximum temperature (°C): {:.1}", e.absolute_tmax),
        format!("Mean annual temperature (°C): {:.1}", e.mean_annual_temp),
        format!(
            "Mean annual precipitation (mm): {}",
            format_number(e.total_annual_rain, 1)
        ),
    ]
}

/// The four monthly sequences in fixed order: precipitation, tmax,
/// mean tmin, absolute tmin.
pub fn sequences(summary: &ClimateSummary) -> [(&'static str, Vec<f64>); 4] {
    let pick = |f: fn(&MonthlySummary) -> f64| -> Vec<f64> {
        summary.months.iter().map(f).collect()
    };
    [
        ("precipitation", pick(|m| m.rain_mean)),
        ("mean_monthly_tmax", pick(|m| m.tmax)),
        ("mean_monthly_tmin", pick(|m| m.tmin_mean)),
        ("absolute_monthly_min_t", pick(|m| m.tmin_min)),
    ]
}

fn join_one_decimal(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_one_decimal(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The R code block for `climatol::diagwl`.
///
/// Station name, elevation and period are inserted verbatim between quotes.
pub fn render_r_code(summary: &ClimateSummary, station: &StationInfo) -> String {
    let mut out = format!("{}\n\n", TOOL_PREFIX);
    let seqs = sequences(summary);
    for (name, values) in &seqs {
        out.push_str(&format!("{} <- c({})\n", name, join_one_decimal(values)));
    }
    out.push('\n');
    out.push_str("data.matrix <- rbind(\n");
    let names: Vec<&str> = seqs.iter().map(|(name, _)| *name).collect();
    out.push_str(&format!("  {})\n\n", names.join(",\n  ")));
    out.push_str(&format!("{}(data.matrix,\n", DIAGRAM_CALL));
    out.push_str(&format!("       est=\"{}\",\n", station.name));
    out.push_str("       cols=NULL,\n");
    out.push_str(&format!("       alt=\"{}\",\n", station.elevation));
    if let Some(period) = &station.period {
        out.push_str(&format!("       per=\"{}\",\n", period));
    }
    out.push_str("       mlab=\"en\")\n");
    out
}

/// Rounded sequences and labels for a plotting front end.
pub fn diagram_params(summary: &ClimateSummary, station: &StationInfo) -> DiagramParams {
    let round = |v: &[f64]| -> Vec<f64> { v.iter().map(|x| (x * 10.0).round() / 10.0).collect() };
    let [rain, tmax, tmin_mean, tmin_min] = sequences(summary);
    DiagramParams {
        station: station.name.clone(),
        elevation: station.elevation.clone(),
        period: station.period.clone().or_else(|| summary.period()),
        tmax_statistic: summary.policy.tmax.to_string(),
        months: summary.months.iter().map(|m| m.month).collect(),
        precipitation: round(&rain.1),
        mean_monthly_tmax: round(&tmax.1),
        mean_monthly_tmin: round(&tmin_mean.1),
        absolute_monthly_min_t: round(&tmin_min.1),
        absolute_tmin: summary.extremes.absolute_tmin,
        absolute_tmax: summary.extremes.absolute_tmax,
    }
}
