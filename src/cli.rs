//! CLI argument parsing for Ventana

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::extract::DEFAULT_TOLERANCE;

#[derive(Parser, Debug)]
#[command(name = "ventana")]
#[command(version)]
#[command(about = "Workload trace period extraction and visualisation", long_about = None)]
pub struct Cli {
    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a trace as an SVG chart
    Plot {
        /// Path to the trace file (.swf or Batsim out_jobs.csv)
        file: PathBuf,

        /// Add a Gantt-style per-job panel below the utilisation curve
        #[arg(long)]
        details: bool,

        /// Output SVG path
        #[arg(short, long, default_value = "plot.svg")]
        output: PathBuf,

        /// Fixed resource capacity (default: declared by the trace, else peak observed)
        #[arg(long, value_name = "N")]
        capacity: Option<u32>,
    },

    /// Extract sub-periods whose utilisation matches a target
    Extract {
        /// Path to the input trace
        workload: PathBuf,

        /// Output CSV path
        output: PathBuf,

        /// Window length in hours (positive integer)
        period: u32,

        /// Target mean utilisation in [0, 1]
        utilisation: f64,

        /// Utilisation match tolerance
        #[arg(long, default_value_t = DEFAULT_TOLERANCE, value_name = "T")]
        tolerance: f64,

        /// Fixed resource capacity (default: declared by the trace, else peak observed)
        #[arg(long, value_name = "N")]
        capacity: Option<u32>,

        /// Write every matching window (numbered files) instead of the first
        #[arg(long)]
        all: bool,
    },

    /// Translate an SWF trace into a Batsim JSON workload
    Convert {
        /// Path to the input SWF trace
        input: PathBuf,

        /// Output JSON path
        output: PathBuf,

        /// Scale cpu values into (0, X] relative to the maximum observed
        #[arg(long, value_name = "X", conflicts_with = "uniform")]
        norm: Option<f64>,

        /// Force every cpu value to X
        #[arg(long, value_name = "X")]
        uniform: Option<f64>,

        /// Cap job durations at SECS seconds
        #[arg(long, value_name = "SECS")]
        trim: Option<f64>,
    },

    /// Print summary statistics for a trace
    Info {
        /// Path to the trace file (.swf or Batsim out_jobs.csv)
        file: PathBuf,

        /// Fixed resource capacity (default: declared by the trace, else peak observed)
        #[arg(long, value_name = "N")]
        capacity: Option<u32>,
    },
}
