//! Climate data editor: turns a table of monthly station observations into
//! long-run monthly summaries and the climatol code for a Walter-Lieth
//! diagram.
//!
//! Flow: [`loader`] → [`schema::normalize`] → [`validate::validate`] →
//! [`aggregate::aggregate`] → [`render`]. Each stage returns a typed result
//! and the first error ends the run.

pub mod aggregate;
pub mod cli;
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod render;
pub mod schema;
pub mod types;
pub mod util;
pub mod validate;

use aggregate::{AggregationPolicy, ClimateSummary};
use error::Result;
use types::RawTable;

/// Output of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub summary: ClimateSummary,
    pub warnings: Vec<String>,
}

/// Normalize, validate and aggregate one uploaded table.
///
/// Pure function of its inputs: the table is not modified and nothing is
/// kept between calls.
pub fn run_pipeline(table: &RawTable, policy: AggregationPolicy) -> Result<PipelineOutput> {
    let normalized = schema::normalize(table)?;
    let report = validate::validate(&normalized)?;
    let summary = aggregate::aggregate(normalized.convention, &report.records, policy);
    Ok(PipelineOutput {
        summary,
        warnings: report.warnings,
    })
}
