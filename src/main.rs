use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use meter_pipeline::{CsvRangeSource, Pipeline, PipelineConfig, ResetPolicy};
use std::path::PathBuf;

mod charts;
mod report;

use charts::ChartRenderer;

#[derive(Parser)]
#[command(name = "energie_report")]
#[command(about = "Monthly electricity, water and gas consumption and costs from meter readings")]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the exported ranges as CSV files
    #[arg(short, long, default_value = ".")]
    source_dir: PathBuf,

    /// Spreadsheet the ranges were exported from
    #[arg(long)]
    spreadsheet_id: Option<String>,

    /// Range of the readings table
    #[arg(long)]
    readings_range: Option<String>,

    /// Directory for the chart images
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Gas conversion factor in kWh per m3
    #[arg(long)]
    gas_factor: Option<f64>,

    /// Name of the date column
    #[arg(long)]
    date_column: Option<String>,

    /// chrono format of the date cells
    #[arg(long)]
    date_format: Option<String>,

    /// Only analyse this year
    #[arg(short, long)]
    year: Option<i32>,

    /// Handling of negative daily deltas (meter resets)
    #[arg(long, value_enum)]
    reset_policy: Option<ResetArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    output: OutputFormat,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum ResetArg {
    Pass,
    Clamp,
    Discard,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
    Csv,
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(id) = &args.spreadsheet_id {
        config.spreadsheet_id = id.clone();
    }
    if let Some(range) = &args.readings_range {
        config.readings_range = range.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(factor) = args.gas_factor {
        config.gas_factor_kwh_per_m3 = factor;
    }
    if let Some(column) = &args.date_column {
        config.date_column = column.clone();
    }
    if let Some(format) = &args.date_format {
        config.date_format = format.clone();
    }
    if args.year.is_some() {
        config.year = args.year;
    }
    if let Some(policy) = &args.reset_policy {
        config.reset_policy = match policy {
            ResetArg::Pass => ResetPolicy::PassThrough,
            ResetArg::Clamp => ResetPolicy::Clamp,
            ResetArg::Discard => ResetPolicy::Discard,
        };
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = build_config(&args)?;
    if !args.source_dir.is_dir() {
        anyhow::bail!("Source directory {} does not exist", args.source_dir.display());
    }

    info!("Starting consumption analysis");
    if !config.spreadsheet_id.is_empty() {
        info!("Spreadsheet {}", config.spreadsheet_id);
    }

    let source = CsvRangeSource::new(&args.source_dir);
    let pipeline = Pipeline::new(config);
    let report = pipeline.run(&source)?;

    if !report.warnings.is_empty() {
        warn!("Pipeline finished with {} warning(s)", report.warnings.len());
    }

    if !args.no_charts {
        let renderer = ChartRenderer::new(&pipeline.config().output_dir)?;
        let mut written = 0;
        for utility in &report.utilities {
            written += renderer.render_utility(utility)?.len();
        }
        info!(
            "Wrote {} charts to {}",
            written,
            pipeline.config().output_dir.display()
        );
    }

    match args.output {
        OutputFormat::Summary => report::print_summary(&report),
        OutputFormat::Json => report::print_json(&report)?,
        OutputFormat::Csv => report::print_csv(&report),
    }

    Ok(())
}
