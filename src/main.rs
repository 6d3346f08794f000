use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use ventana::cli::{Cli, Command};
use ventana::convert::{self, ConvertOptions};
use ventana::extract::{self, ExtractConfig};
use ventana::workload::{Capacity, Workload};
use ventana::{batsim, plot, stats};

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn capacity_arg(fixed: Option<u32>) -> Capacity {
    fixed.map_or(Capacity::Auto, Capacity::Fixed)
}

fn run_plot(file: &Path, details: bool, output: &Path, capacity: Option<u32>) -> Result<()> {
    let workload = Workload::from_file(file)?;
    let capacity = workload.resolve_capacity(capacity_arg(capacity));
    plot::render(&workload, output, details, capacity)?;
    println!("wrote {}", output.display());
    Ok(())
}

fn run_extract(
    workload_path: &Path,
    output: &Path,
    period: u32,
    utilisation: f64,
    tolerance: f64,
    capacity: Option<u32>,
    all: bool,
) -> Result<()> {
    let workload = Workload::from_file(workload_path)?;
    let config = ExtractConfig {
        tolerance,
        capacity: capacity_arg(capacity),
    };
    let periods =
        extract::extract_periods_with_given_utilisation(&workload, period, utilisation, &config)?;

    // a legitimate empty outcome, not an error
    if periods.is_empty() {
        println!(
            "no window of {period}h matches utilisation {utilisation} (tolerance {tolerance})"
        );
        return Ok(());
    }

    if all {
        for (index, sub) in periods.iter().enumerate() {
            let path = numbered(output, index);
            sub.to_csv(&path)?;
            println!("wrote {} ({} jobs)", path.display(), sub.jobs().len());
        }
    } else {
        periods[0].to_csv(output)?;
        println!("wrote {} ({} jobs)", output.display(), periods[0].jobs().len());
    }
    Ok(())
}

/// `out.csv` -> `out.0.csv`, `out.1.csv`, ... for `--all` output
fn numbered(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("period");
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    path.with_file_name(format!("{stem}.{index}.{extension}"))
}

fn run_convert(
    input: &Path,
    output: &Path,
    norm: Option<f64>,
    uniform: Option<f64>,
    trim: Option<f64>,
) -> Result<()> {
    let workload = Workload::from_file(input)?;
    let options = ConvertOptions {
        normalize: norm,
        uniform,
        trim,
    };
    let translated = convert::to_batsim_json(&workload, &options)?;
    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    batsim::write_json(BufWriter::new(file), &translated)?;
    println!(
        "wrote {} ({} jobs, {} profiles)",
        output.display(),
        translated.jobs.len(),
        translated.profiles.len()
    );
    Ok(())
}

fn run_info(file: &Path, capacity: Option<u32>) -> Result<()> {
    let workload = Workload::from_file(file)?;
    let capacity = workload.resolve_capacity(capacity_arg(capacity));
    println!("{}", stats::Summary::compute(&workload, capacity));
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    match args.command {
        Command::Plot {
            file,
            details,
            output,
            capacity,
        } => run_plot(&file, details, &output, capacity),
        Command::Extract {
            workload,
            output,
            period,
            utilisation,
            tolerance,
            capacity,
            all,
        } => run_extract(&workload, &output, period, utilisation, tolerance, capacity, all),
        Command::Convert {
            input,
            output,
            norm,
            uniform,
            trim,
        } => run_convert(&input, &output, norm, uniform, trim),
        Command::Info { file, capacity } => run_info(&file, capacity),
    }
}
