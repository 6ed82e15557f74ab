use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use saint_heatmap::{run, HeatmapConfig};

/// Render the Split-TurboID SAINT-score heatmap.
///
/// With no arguments the built-in figure constants are used.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON configuration; fields it omits keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input table (.csv, .tsv, .parquet or .json).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn effective_config(cli: &Cli) -> Result<HeatmapConfig> {
    let mut config = match &cli.config {
        Some(path) => HeatmapConfig::from_json_file(path)?,
        None => HeatmapConfig::default(),
    };
    if let Some(input) = &cli.input {
        config.input = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    Ok(config)
}

fn try_main(cli: &Cli) -> Result<()> {
    let config = effective_config(cli)?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let report = run(&config)?;
    for line in &report.summary {
        println!("{line}");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
