//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::aggregate::{AggregationPolicy, Statistic};
use crate::loader::LoadOptions;
use crate::types::StationInfo;

#[derive(Parser, Debug)]
#[command(version, about = "Prepare monthly climate data for Walter-Lieth diagrams", long_about = None)]
pub struct Cli {
    /// Monthly observations (.csv, or .json array of records)
    pub input: PathBuf,

    /// Station name written into the diagram call
    #[arg(long, default_value = "StationName")]
    pub station: String,

    /// Station elevation in meters, free text
    #[arg(long, default_value = "Altitude")]
    pub elevation: String,

    /// Observation period label, e.g. 1991-2020
    #[arg(long)]
    pub period: Option<String>,

    /// Statistic used for the monthly Tmax column
    #[arg(long, value_enum, default_value_t = TmaxArg::Max)]
    pub tmax: TmaxArg,

    /// Field delimiter for CSV input
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Write monthly_summary.csv, yearly_totals.csv, diagram.json and climatol.R here
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print only the R code
    #[arg(short, long)]
    pub quiet: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TmaxArg {
    /// Absolute monthly maximum
    Max,
    /// Mean monthly maximum
    Mean,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl Cli {
    pub fn policy(&self) -> AggregationPolicy {
        AggregationPolicy {
            tmax: match self.tmax {
                TmaxArg::Max => Statistic::Max,
                TmaxArg::Mean => Statistic::Mean,
            },
        }
    }

    pub fn station_info(&self) -> StationInfo {
        StationInfo {
            name: self.station.clone(),
            elevation: self.elevation.clone(),
            period: self.period.clone(),
        }
    }

    pub fn load_options(&self) -> anyhow::Result<LoadOptions> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter must be a single ASCII character");
        }
        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
        })
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_form_placeholders() {
        let cli = Cli::parse_from(["climate-editor", "data.csv"]);
        let station = cli.station_info();
        assert_eq!(station.name, "StationName");
        assert_eq!(station.elevation, "Altitude");
        assert_eq!(station.period, None);
        assert_eq!(cli.policy(), AggregationPolicy::default());
        assert_eq!(cli.load_options().unwrap().delimiter, b',');
        assert_eq!(cli.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn parses_options() {
        let cli = Cli::parse_from([
            "climate-editor",
            "data.csv",
            "--station",
            "Pocsaj",
            "--elevation",
            "97",
            "--tmax",
            "mean",
            "--delimiter",
            ";",
            "--quiet",
        ]);
        assert_eq!(cli.policy().tmax, Statistic::Mean);
        assert_eq!(cli.load_options().unwrap().delimiter, b';');
        assert!(cli.quiet);
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        let cli = Cli::parse_from(["climate-editor", "data.csv", "--delimiter", "§"]);
        assert!(cli.load_options().is_err());
    }
}
