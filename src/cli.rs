use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use silvascan::layout::{ItemKind, TreemapConfig};
use silvascan::scanner::types::MAX_ENTRIES_LIMIT;
use silvascan::scanner::ScanRequest;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Direct children of the focused directory
    Children,
    /// Every materialized directory, largest first
    Folders,
    /// Treemap rectangles for the focused directory
    Treemap,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "silvascan=trace",
            LogLevel::Debug => "silvascan=debug",
            LogLevel::Info => "silvascan=info",
            LogLevel::Warn => "silvascan=warn",
            LogLevel::Error => "silvascan=error",
        }
    }
}

/// Scan a directory tree and show where the space went.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// Directory (or file) to scan
    pub root: PathBuf,
    /// Cap on entries kept in the tree (clamped to 1..=200000)
    #[arg(long, default_value_t = MAX_ENTRIES_LIMIT)]
    pub max_entries: usize,
    /// Files smaller than this many bytes are counted but not listed
    #[arg(long, default_value_t = 0)]
    pub min_size: u64,
    #[arg(long, value_enum, default_value = "children")]
    pub view: View,
    /// Maximum rectangles in a treemap frame
    #[arg(long, default_value_t = 300)]
    pub limit: usize,
    /// Treemap shows directories instead of files
    #[arg(long)]
    pub dirs: bool,
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,
    #[arg(long, default_value_t = 800.0)]
    pub height: f64,
    /// Zoom into this directory of the scanned tree before rendering
    #[arg(long)]
    pub zoom: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
    #[arg(long, short, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Cli {
    pub fn scan_request(&self) -> ScanRequest {
        ScanRequest::new(&self.root)
            .with_max_entries(self.max_entries)
            .with_min_size_bytes(self.min_size)
    }

    pub fn treemap_config(&self) -> TreemapConfig {
        TreemapConfig {
            max_items: self.limit,
            kind: if self.dirs {
                ItemKind::Directories
            } else {
                ItemKind::Files
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["silvascan", "/data"]).unwrap();
        assert_eq!(cli.view, View::Children);
        assert_eq!(cli.scan_request().max_entries, MAX_ENTRIES_LIMIT);
        assert_eq!(cli.treemap_config(), TreemapConfig::default());
    }

    #[test]
    fn limits_are_clamped_into_request() {
        let cli = Cli::try_parse_from([
            "silvascan",
            "/data",
            "--max-entries",
            "999999999",
            "--min-size",
            "1048576",
            "--view",
            "treemap",
            "--dirs",
        ])
        .unwrap();
        let request = cli.scan_request();
        assert_eq!(request.max_entries, MAX_ENTRIES_LIMIT);
        assert_eq!(request.min_size_bytes, 1_048_576);
        assert_eq!(cli.treemap_config().kind, ItemKind::Directories);
    }
}
