//! sscontrol - discrete-time state-space controller
//!
//! Loads a controller from a data file and runs it over cycles read from stdin.
//!
//! # Usage
//!
//! ```bash
//! # one error value per line
//! printf '1\n1\n1\n' | sscontrol controller.dat
//!
//! # reference and measurement per line, clamped output, full trace
//! sscontrol controller.dat --reference-mode --u-min -10 --u-max 10 --trace < cycles.txt
//! ```

use std::path::PathBuf;

use clap::Parser;
use sscontrol::{
    error::Result,
    stream::{process_stdio, InputMode, RunConfig},
    Saturation, StateSpaceController,
};
use tracing::Level;

/// Discrete-time state-space controller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the controller data file
    #[arg(value_name = "DATA_FILE")]
    data_file: PathBuf,

    /// Read reference and measurement values per line instead of errors
    #[arg(short, long)]
    reference_mode: bool,

    /// Lower output bound, shared by all channels
    #[arg(long, requires = "u_max", allow_hyphen_values = true)]
    u_min: Option<f64>,

    /// Upper output bound, shared by all channels
    #[arg(long, requires = "u_min", allow_hyphen_values = true)]
    u_max: Option<f64>,

    /// Print time, signals and state for every cycle
    #[arg(short, long)]
    trace: bool,

    /// Print the coefficient summary to stderr before running
    #[arg(short, long)]
    summary: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Load the controller
    let mut controller = StateSpaceController::<f64>::from_file(&args.data_file)?;

    if args.summary {
        eprintln!("{}", controller.summary());
    }

    let mode = if args.reference_mode {
        InputMode::ReferenceMeasurement
    } else {
        InputMode::Error
    };
    let mut config = RunConfig::new().with_mode(mode).with_trace(args.trace);
    if let (Some(min), Some(max)) = (args.u_min, args.u_max) {
        config = config.with_limits(Saturation::uniform(min, max)?);
    }

    // Run cycles from stdin
    process_stdio(&mut controller, &config)?;

    Ok(())
}
