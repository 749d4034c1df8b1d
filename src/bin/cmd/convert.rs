// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Convert command - re-write records through the codec.

use std::path::PathBuf;

use clap::Subcommand;

use crate::common::{open_reader, ProgressBar, ReadOptions, Result};
use sonarcodec::{FormatId, WriterBuilder};

/// Re-write files record by record.
#[derive(Subcommand, Clone, Debug)]
pub enum ConvertCmd {
    /// Decode every record and encode it again in the same format
    ///
    /// Garbage between records and rejected records are dropped, so the
    /// output of a clean input is byte-identical to it. Inputs recorded
    /// without size fields are written without them.
    Copy {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        options: ReadOptions,
    },
}

impl ConvertCmd {
    pub fn run(self) -> Result<()> {
        match self {
            ConvertCmd::Copy {
                input,
                output,
                options,
            } => cmd_copy(input, output, options),
        }
    }
}

/// Copy records from input to output.
fn cmd_copy(input: PathBuf, output: PathBuf, options: ReadOptions) -> Result<()> {
    let mut reader = open_reader(&input, &options)?;
    let format: FormatId = reader
        .driver()
        .map(|d| d.info().id)
        .ok_or_else(|| anyhow::anyhow!("reader has no format driver"))?;

    println!("Copying {format} records:");
    println!("  Input:  {}", input.display());
    println!("  Output: {}", output.display());
    if !reader.has_size_fields() {
        println!("  Size fields: absent in input, omitted in output");
    }

    let total = std::fs::metadata(&input).map(|m| m.len()).unwrap_or(0);
    let progress = ProgressBar::new(total, "copy");
    let mut writer = WriterBuilder::new()
        .path(&output)
        .format(format)
        .size_fields(reader.has_size_fields())
        .build()?;

    while let Some(record) = reader.next_record()? {
        writer.write_record(&record)?;
        progress.set_position(reader.stats().bytes_read);
    }

    let written = writer.finish()?;
    let stats = reader.finish();
    progress.finish_with_message(format!("{written} records"));

    println!("  Records written: {written}");
    if stats.rejected > 0 {
        println!("  Records rejected: {}", stats.rejected);
    }
    if stats.resync.bytes_skipped > 0 {
        println!(
            "  Bytes skipped: {} in {} gaps",
            stats.resync.bytes_skipped, stats.resync.events
        );
    }
    println!("  Copy complete!");
    Ok(())
}
