// Entry point and high-level CLI flow.
//
// One invocation reads one table, runs the pipeline, and prints:
// - the monthly summary and station extremes (unless --quiet),
// - the climatol R code block.
// With --out-dir the same results are also written to files, plus a JSON
// dump of the raw statistics.
use anyhow::{Context, Result};
use clap::Parser;
use climate_editor::cli::Cli;
use climate_editor::{loader, logging, output, render, run_pipeline, util};
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.level_filter()) {
        eprintln!("Failed to install logger: {}", e);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let opts = cli.load_options()?;
    let (table, load_report) = loader::load_table(&cli.input, &opts)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    let result = run_pipeline(&table, cli.policy())?;
    let summary = &result.summary;
    info!(
        "Input format: {} ({} years)",
        summary.convention,
        summary.years.len()
    );

    let station = cli.station_info();
    let monthly = render::summary_table(summary);
    let years = render::year_rows(summary);
    let r_code = render::render_r_code(summary, &station);

    if !cli.quiet {
        println!(
            "Loaded {} rows (columns: {})\n",
            util::format_int(load_report.total_rows),
            load_report.columns.join(", ")
        );
        println!("Output Data\n");
        println!("{}\n", output::summary_markdown(&monthly));
        for line in render::extremes_lines(summary) {
            println!("{}", line);
        }
        for w in &result.warnings {
            println!("Note: {}", w);
        }
        println!("\nYearly totals\n");
        output::preview_table_rows(&years, years.len());
        println!("Output text for climatol/diagwl\n");
    }
    print!("{}", r_code);

    if let Some(dir) = &cli.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        output::write_summary_csv(
            &dir.join("monthly_summary.csv"),
            &render::summary_export_table(summary),
        )?;
        output::write_csv(
            &dir.join("yearly_totals.csv"),
            &render::year_export_rows(summary),
        )?;
        output::write_json(
            &dir.join("diagram.json"),
            &render::diagram_params(summary, &station),
        )?;
        output::write_text(&dir.join("climatol.R"), &r_code)?;
        output::write_json(&dir.join("summary.json"), summary)?;
        info!("Outputs saved to {}", dir.display());
    }
    Ok(())
}
