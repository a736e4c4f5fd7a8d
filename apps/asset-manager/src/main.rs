//! # asset-manager
//!
//! Render, check or inspect the load schedule of an asset manifest.

#![deny(unsafe_code)]

use asset_manager::cli::{cmd_check, cmd_render, cmd_schedule, CliError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "asset-manager", version, about = "Dependency-aware front-end asset engine")]
struct Cli {
    /// Suppress diagnostic markup in rendered output.
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the full HTML document for a manifest.
    Render {
        manifest: PathBuf,

        /// Write the document to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report every diagnostic raised during a render cycle.
    Check {
        manifest: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Show the validate/load callbacks in execution order.
    Schedule {
        manifest: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render { manifest, output } => {
            let document = cmd_render(&manifest, cli.quiet)?;
            match output {
                Some(path) => std::fs::write(&path, document)
                    .map_err(|source| CliError::Io { path, source })?,
                None => print!("{document}"),
            }
        }
        Command::Check { manifest, json } => {
            print!("{}", cmd_check(&manifest, json, cli.quiet)?);
        }
        Command::Schedule { manifest, json } => {
            print!("{}", cmd_schedule(&manifest, json)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
