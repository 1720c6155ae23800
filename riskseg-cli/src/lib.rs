#![warn(missing_docs)]
//! riskseg CLI Library
//!
//! Reads an insurance dataset (a JSON array of records), runs the segment
//! test battery and prints the report.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     riskseg_cli::run()
//! }
//! ```

mod config;

pub use config::*;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use riskseg_core::{BatteryConfig, ColumnDef, Dataset, Schema, SegmentTester};
use riskseg_report::{OutputFormat, Report, build_report, format_missing_table, render};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// riskseg CLI arguments
#[derive(Parser, Debug)]
#[command(name = "riskseg")]
#[command(author, version, about = "riskseg - segment hypothesis testing for insurance data")]
pub struct Cli {
    /// Optional subcommand (Run, Missing, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Dataset: JSON array of records keyed by column name
    pub input: Option<PathBuf>,

    /// Output format: json, human (default from riskseg.toml, else human)
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file (discovered from the current directory if not specified)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Significance threshold, overrides the configuration file
    #[arg(long, global = true)]
    pub alpha: Option<f64>,

    /// Number of threads for the scenario pool
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0", global = true)]
    pub threads: usize,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the test battery (default)
    Run {
        /// Dataset: JSON array of records keyed by column name
        input: PathBuf,
    },
    /// Print the missing-value summary of a dataset
    Missing {
        /// Dataset: JSON array of records keyed by column name
        input: PathBuf,
    },
    /// Print the default riskseg.toml
    Init,
}

/// Run the riskseg CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the riskseg CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => RisksegConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => RisksegConfig::discover().unwrap_or_default(),
    };
    if let Some(alpha) = cli.alpha {
        config.analysis.alpha = alpha;
        config.validate()?;
    }

    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .map_err(anyhow::Error::msg)?;

    if cli.threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    let output = match (&cli.command, &cli.input) {
        (Some(Commands::Init), _) => RisksegConfig::default_toml(),
        (Some(Commands::Missing { input }), _) => missing_values(input, &config, format)?,
        (Some(Commands::Run { input }), _) | (None, Some(input)) => {
            run_battery(input, &config, format)?
        }
        (None, None) => anyhow::bail!("No input dataset given (try `riskseg run <INPUT.json>`)"),
    };

    write_output(cli.output.as_deref(), &output)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "riskseg=debug"
    } else {
        "riskseg=info"
    };
    // A subscriber may already be installed when embedded in another binary
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_battery(input: &Path, config: &RisksegConfig, format: OutputFormat) -> anyhow::Result<String> {
    let dataset = load_dataset(input, &config.battery)?;

    let start = Instant::now();
    let report = analyze_dataset(&dataset, config);
    tracing::info!(
        rows = dataset.len(),
        rejected = report.summary.rejected,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "battery complete"
    );

    Ok(render(&report, format)?)
}

fn missing_values(input: &Path, config: &RisksegConfig, format: OutputFormat) -> anyhow::Result<String> {
    let dataset = load_dataset(input, &config.battery)?;
    let missing = dataset.missing_summary();
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&missing)?,
        OutputFormat::Human => format_missing_table(&missing),
    })
}

fn write_output(path: Option<&Path>, output: &str) -> anyhow::Result<()> {
    if let Some(path) = path {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }
    Ok(())
}

/// Insurance schema extended with every column the battery is configured to read
pub fn schema_for(battery: &BatteryConfig) -> Schema {
    let categorical = [
        &battery.province_column,
        &battery.postal_code_column,
        &battery.gender_column,
    ];
    let numeric = [&battery.premium_column, &battery.margin_column];

    let schema = categorical
        .into_iter()
        .fold(Schema::insurance(), |s, c| s.with_column(ColumnDef::categorical(c.as_str())));
    numeric
        .into_iter()
        .fold(schema, |s, c| s.with_column(ColumnDef::numeric(c.as_str())))
}

/// Read a dataset file against [`schema_for`]
pub fn load_dataset(path: &Path, battery: &BatteryConfig) -> anyhow::Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open dataset {}", path.display()))?;
    let dataset = Dataset::from_json_reader(schema_for(battery), BufReader::new(file))
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    tracing::debug!(rows = dataset.len(), columns = dataset.schema().len(), "dataset loaded");
    Ok(dataset)
}

/// Run the battery on a dataset and assemble the report
pub fn analyze_dataset(dataset: &Dataset, config: &RisksegConfig) -> Report {
    let tester = SegmentTester::with_config(dataset, config.analysis.clone());
    let battery = tester.run_battery(&config.battery);
    let mut report = build_report(&battery, dataset, config.analysis.alpha);
    if !config.output.include_missing {
        report.missing.clear();
    }
    report
}
