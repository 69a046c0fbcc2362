//! Hexcolony CLI - run and inspect colony scenarios.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Hexcolony - hex-grid construction and resource economy simulator
#[derive(Parser, Debug)]
#[command(name = "hexcolony")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log placements and disables, ignoring the environment filter
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario and report ledgers per tick
    Simulate {
        /// Scenario JSON file
        #[arg(required = true)]
        scenario: std::path::PathBuf,

        /// Override the scenario's tick count
        #[arg(short, long)]
        ticks: Option<u32>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Check a scenario file without running it
    Validate {
        /// Scenario JSON file
        #[arg(required = true)]
        scenario: std::path::PathBuf,
    },

    /// Print an example scenario
    Template {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("hexcolony=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Simulate {
            scenario,
            ticks,
            format,
        } => cli::simulate::execute(&scenario, ticks, format),

        Commands::Validate { scenario } => cli::validate::execute(&scenario),

        Commands::Template { output } => cli::template::execute(output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
