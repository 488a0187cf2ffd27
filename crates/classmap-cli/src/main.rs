//! classmap CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use classmap_cli::{Args, error_adapter::render_reports};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting classmap");
    debug!(args:?; "Parsed arguments");

    match classmap_cli::run(&args) {
        Ok(dashboard) => {
            info!(
                types = dashboard.types(),
                relationships = dashboard.relationships();
                "Completed successfully"
            );
        }
        Err(err) => {
            // Render each diagnostic independently
            for report in render_reports(&err) {
                error!("{report}");
            }
            process::exit(1);
        }
    }
}
