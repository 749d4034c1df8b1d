// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show file summary, registered formats and records.

use std::path::PathBuf;

use clap::Subcommand;

use crate::common::{format_duration, format_timestamp, open_reader, ReadOptions, Result};
use sonarcodec::DriverRegistry;

/// Inspect file contents.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Show record counts, time span and resync statistics
    Info {
        /// Input file (SXP, SXI or ALL)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        options: ReadOptions,
    },

    /// List the registered format drivers
    Formats {
        /// Print the capability tables as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print decoded records
    Dump {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Maximum number of records to print
        #[arg(short = 'n', long)]
        limit: Option<u64>,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: ReadOptions,
    },
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        match self {
            InspectCmd::Info { input, options } => cmd_info(input, options),
            InspectCmd::Formats { json } => cmd_formats(json),
            InspectCmd::Dump {
                input,
                limit,
                json,
                options,
            } => cmd_dump(input, limit, json, options),
        }
    }
}

/// Cmd: Show file info
fn cmd_info(input: PathBuf, options: ReadOptions) -> Result<()> {
    let mut reader = open_reader(&input, &options)?;
    let format = reader
        .driver()
        .map(|d| d.info().name)
        .unwrap_or("unknown");

    let size_fields = reader.has_size_fields();
    while reader.next_record()?.is_some() {}
    let high_water = reader.buffer().high_water_mark();
    let stats = reader.finish();

    println!("=== {} ===", input.display());
    println!("Format: {format}");
    if !size_fields {
        println!("Size fields: absent (restored while reading)");
    }
    println!("Records: {}", stats.records);
    println!("Rejected: {}", stats.rejected);
    println!("Bytes read: {}", stats.bytes_read);

    if let Some((start, end)) = stats.time_span() {
        println!("Start: {}", format_timestamp(start));
        println!("End: {}", format_timestamp(end));
        println!("Duration: {}", format_duration(end - start));
    }

    println!();
    println!("Records by kind:");
    for (kind, count) in &stats.by_kind {
        println!("  {kind}: {count}");
    }
    println!("Records by type:");
    for (name, count) in &stats.by_name {
        println!("  {name}: {count}");
    }

    println!();
    println!(
        "Resync: {} events, {} bytes skipped, largest gap {}",
        stats.resync.events, stats.resync.bytes_skipped, stats.resync.largest_gap
    );
    println!(
        "Largest record: {} bytes (buffer high-water {high_water})",
        stats.largest_record
    );

    Ok(())
}

/// Cmd: List formats
fn cmd_formats(json: bool) -> Result<()> {
    let registry = DriverRegistry::with_builtin();
    let infos = registry.list();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in infos {
        println!("{} ({}) [{}]", info.name, info.system, info.id);
        println!("  {}", info.description);
        println!("  Extensions: {}", info.extensions.join(", "));
        if !info.aliases.is_empty() {
            println!("  Aliases: {}", info.aliases.join(", "));
        }
        println!("  Largest record: {} bytes", info.max_record_size);
        println!(
            "  Beams: {} bathymetry, {} amplitude, {} pixels{}",
            info.max_beams,
            info.max_amplitude_beams,
            info.max_pixels,
            if info.variable_beams { " (variable)" } else { "" }
        );
        println!(
            "  Beam width: {:.2} x {:.2} deg",
            info.beamwidth_xtrack, info.beamwidth_ltrack
        );
        println!(
            "  Sources: nav={} heading={} attitude={}",
            info.nav_source, info.heading_source, info.attitude_source
        );
        println!(
            "  Byte order: {}, checksum: {}",
            info.endianness,
            if info.framing.has_checksum() { "yes" } else { "no" }
        );
        println!();
    }

    Ok(())
}

/// Cmd: Print records
fn cmd_dump(input: PathBuf, limit: Option<u64>, json: bool, options: ReadOptions) -> Result<()> {
    let mut reader = open_reader(&input, &options)?;
    let mut printed = 0u64;

    while let Some(record) = reader.next_record()? {
        if limit.is_some_and(|n| printed >= n) {
            break;
        }
        if json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("{record}");
        }
        printed += 1;
    }

    let stats = reader.finish();
    if !json && (stats.rejected > 0 || stats.resync.bytes_skipped > 0) {
        eprintln!(
            "{} rejected records, {} bytes skipped",
            stats.rejected, stats.resync.bytes_skipped
        );
    }

    Ok(())
}
