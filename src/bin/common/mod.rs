// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};

use clap::Args;
use sonarcodec::{FormatId, ReaderBuilder, SonarConfig, SonarReader};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Reader options shared by the commands that open an input file.
#[derive(Args, Clone, Debug, Default)]
pub struct ReadOptions {
    /// Input format (detected from the extension or header when omitted)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<FormatId>,

    /// TOML reader configuration
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Fail on the first rejected record instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

impl ReadOptions {
    /// Configuration from the file (if any) with command-line overrides.
    pub fn load_config(&self) -> Result<SonarConfig> {
        let mut config = match &self.config {
            Some(path) => SonarConfig::from_file(path)?,
            None => SonarConfig::default(),
        };
        if self.format.is_some() {
            config.format = self.format;
        }
        if self.strict {
            config.stop_on_record_error = true;
        }
        Ok(config)
    }
}

/// Open a file with the given options.
pub fn open_reader(path: &Path, options: &ReadOptions) -> Result<SonarReader> {
    let config = options.load_config()?;
    Ok(ReaderBuilder::new().path(path).config(config).build()?)
}

/// Format a duration in seconds to human-readable string.
pub fn format_duration(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let secs = total_millis / 1000;
    let millis = total_millis % 1000;

    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

/// Format an epoch time in seconds to human-readable string.
pub fn format_timestamp(seconds: f64) -> String {
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    match chrono::DateTime::<chrono::Utc>::from_timestamp(whole as i64, nanos) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
        None => format!("{seconds} s"),
    }
}

/// Progress bar wrapper, hidden when stderr is not a terminal.
pub struct ProgressBar {
    inner: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a progress bar over `total` bytes.
    pub fn new(total: u64, prefix: impl Into<String>) -> Self {
        let inner = if std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new(total);
            if let Ok(style) = indicatif::ProgressStyle::with_template(
                "{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} {msg}",
            ) {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb.set_prefix(prefix.into());
            Some(pb)
        } else {
            None
        };

        Self { inner }
    }

    /// Move the bar to `pos` bytes.
    pub fn set_position(&self, pos: u64) {
        if let Some(pb) = &self.inner {
            pb.set_position(pos);
        }
    }

    /// Finish the progress bar with a message.
    pub fn finish_with_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.finish_with_message(msg);
        }
    }
}
