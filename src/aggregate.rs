use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::schema::Convention;
use crate::types::{CanonicalRecord, MonthlySummary, StationExtremes, YearTotal};
use crate::util::average;

/// How a group of samples collapses into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Max,
    Min,
}

impl Statistic {
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Statistic::Mean => average(values),
            Statistic::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Statistic::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Max => "max",
            Statistic::Min => "min",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Per-field choice for the statistics that differ between editor versions.
///
/// Precipitation is always a mean and tmin always yields both mean and min;
/// only the tmax column has two competing definitions. `Max` is the absolute
/// monthly maximum, `Mean` is the mean monthly maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregationPolicy {
    pub tmax: Statistic,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        AggregationPolicy {
            tmax: Statistic::Max,
        }
    }
}

impl AggregationPolicy {
    /// Column header for the tmax statistic, e.g. `Tmax_max`.
    pub fn tmax_label(&self) -> String {
        format!("Tmax_{}", self.tmax.suffix())
    }
}

/// Everything the renderer needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateSummary {
    #[serde(skip)]
    pub convention: Convention,
    pub policy: AggregationPolicy,
    /// Exactly 12 entries, months 1 through 12.
    pub months: Vec<MonthlySummary>,
    pub extremes: StationExtremes,
    pub years: Vec<YearTotal>,
}

impl ClimateSummary {
    pub fn first_year(&self) -> Option<i32> {
        self.years.first().map(|y| y.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().map(|y| y.year)
    }

    /// `first-last` span of the data, e.g. `1991-2020`.
    pub fn period(&self) -> Option<String> {
        match (self.first_year(), self.last_year()) {
            (Some(a), Some(b)) => Some(format!("{}-{}", a, b)),
            _ => None,
        }
    }
}

/// Group validated records by calendar month and compute the summaries.
///
/// The input must already have passed `validate`, which guarantees every
/// month has at least one sample.
pub fn aggregate(
    convention: Convention,
    records: &[CanonicalRecord],
    policy: AggregationPolicy,
) -> ClimateSummary {
    #[derive(Default)]
    struct Acc {
        rain: Vec<f64>,
        tmin: Vec<f64>,
        tmax: Vec<f64>,
    }

    let mut by_month: BTreeMap<u32, Acc> = (1..=12).map(|m| (m, Acc::default())).collect();
    for r in records {
        let e = by_month.entry(r.month).or_default();
        e.rain.push(r.rain);
        e.tmin.push(r.tmin);
        e.tmax.push(r.tmax);
    }

    let months: Vec<MonthlySummary> = by_month
        .into_iter()
        .map(|(month, acc)| {
            let tmin_min = Statistic::Min.apply(&acc.tmin);
            MonthlySummary {
                month,
                rain_mean: Statistic::Mean.apply(&acc.rain),
                tmax: policy.tmax.apply(&acc.tmax),
                // Summation rounding must not put the mean below the minimum.
                tmin_mean: Statistic::Mean.apply(&acc.tmin).max(tmin_min),
                tmin_min,
            }
        })
        .collect();

    let years = yearly_totals(records);
    let extremes = station_extremes(records, &years);

    ClimateSummary {
        convention,
        policy,
        months,
        extremes,
        years,
    }
}

/// Rain total and mean temperature for each year, ascending.
pub fn yearly_totals(records: &[CanonicalRecord]) -> Vec<YearTotal> {
    let mut by_year: BTreeMap<i32, (f64, Vec<f64>)> = BTreeMap::new();
    for r in records {
        let e = by_year.entry(r.year).or_default();
        e.0 += r.rain;
        e.1.push(representative_temp(r));
    }
    by_year
        .into_iter()
        .map(|(year, (rain_total, temps))| YearTotal {
            year,
            rain_total,
            temp_mean: average(&temps),
        })
        .collect()
}

fn station_extremes(records: &[CanonicalRecord], years: &[YearTotal]) -> StationExtremes {
    let tmin: Vec<f64> = records.iter().map(|r| r.tmin).collect();
    let tmax: Vec<f64> = records.iter().map(|r| r.tmax).collect();
    let temps: Vec<f64> = records.iter().map(representative_temp).collect();
    let rain_totals: Vec<f64> = years.iter().map(|y| y.rain_total).collect();
    StationExtremes {
        absolute_tmin: Statistic::Min.apply(&tmin),
        absolute_tmax: Statistic::Max.apply(&tmax),
        mean_annual_temp: average(&temps),
        total_annual_rain: average(&rain_totals),
    }
}

// Tavg when the source has it, otherwise the midpoint of tmin and tmax.
fn representative_temp(r: &CanonicalRecord) -> f64 {
    r.tavg.unwrap_or((r.tmin + r.tmax) / 2.0)
}
