// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Sonarcodec CLI
//!
//! Command-line tool for multibeam sonar record files.
//!
//! ## Usage
//!
//! ```sh
//! # Show record counts, time span and skipped bytes
//! sonarcodec inspect info line_0001.sxp
//!
//! # List supported formats
//! sonarcodec inspect formats
//!
//! # Print the first ten records as JSON
//! sonarcodec inspect dump 0001_20020315.all --limit 10 --json
//!
//! # Re-write a file through the codec
//! sonarcodec convert copy input.all output.all
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{ConvertCmd, InspectCmd};
use common::Result;

/// Sonarcodec - multibeam sonar record toolkit
///
/// Read, dump and re-write SWATHplus and Simrad EM files.
/// Format auto-detection means you rarely need to specify file types.
#[derive(Parser, Clone)]
#[command(name = "sonarcodec")]
#[command(about = "Multibeam sonar record toolkit for SWATHplus and Simrad EM files", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Inspect file contents (info, formats, dump)
    #[command(subcommand)]
    Inspect(InspectCmd),

    /// Re-write files through the codec (copy)
    #[command(subcommand)]
    Convert(ConvertCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(cmd) => cmd.run(),
        Commands::Convert(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
