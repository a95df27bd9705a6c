//! Route Metadata Compiler - Command-line tool for endpoint declaration analysis.
//!
//! This binary provides a command-line interface for compiling route metadata
//! from declaratively-shaped endpoint types. It analyzes your source code for
//! endpoint, group, and validator declarations, reports diagnostics for
//! conflicting configurations, and emits the registration source that wires
//! the surviving routes into a router.
//!
//! # Usage
//!
//! ```bash
//! routegen [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Print a YAML report of routes and diagnostics:
//! ```bash
//! routegen ./my-api-project
//! ```
//!
//! Write a JSON report and the generated registration source:
//! ```bash
//! routegen ./my-api-project -f json -o routes.json -g src/generated.rs
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! routegen ./my-api-project -v
//! ```

mod cli;
mod scanner;
mod parser;
mod location;
mod ast;
mod detector;
mod extractor;
mod diagnostics;
mod naming;
mod resolver;
mod codegen;
mod cache;
mod cancel;
mod pipeline;
mod serializer;
mod error;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // We need to parse args twice: once to get verbose flag, then again after logger init
    // First, do a quick parse just to check for verbose flag
    let args_for_verbose = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Route Metadata Compiler starting...");

    // Now do the full parse with validation
    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    // Run the main workflow
    cli::run(args)?;

    info!("Route metadata compilation completed successfully");

    Ok(())
}
