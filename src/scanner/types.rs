use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// Hard ceiling on materialized child entries for one scan.
pub const MAX_ENTRIES_LIMIT: usize = 200_000;

/// Hint carried by the terminal progress event.
pub const DONE_HINT: &str = "done";

/// Immutable input to one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Directory (or single file) to scan
    pub root: PathBuf,
    /// Global cap on nodes materialized into `children` lists, in `[1, MAX_ENTRIES_LIMIT]`
    pub max_entries: usize,
    /// Files smaller than this are counted but never materialized
    pub min_size_bytes: u64,
}

impl ScanRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_entries: MAX_ENTRIES_LIMIT,
            min_size_bytes: 0,
        }
    }

    /// Set the entry budget, clamped to `[1, MAX_ENTRIES_LIMIT]`.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.clamp(1, MAX_ENTRIES_LIMIT);
        self
    }

    pub fn with_min_size_bytes(mut self, min_size_bytes: u64) -> Self {
        self.min_size_bytes = min_size_bytes;
        self
    }

    /// Same limits, different root.
    pub fn rerooted(&self, root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..self.clone()
        }
    }

    /// Budget actually applied by the walker. Guards against requests built
    /// with struct literals that skipped the clamping setters.
    pub fn effective_budget(&self) -> usize {
        self.max_entries.clamp(1, MAX_ENTRIES_LIMIT)
    }
}

/// Counters shared across one walk. Only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanCounters {
    pub files_scanned: u64,
    pub dirs_scanned: u64,
    pub bytes_total: u64,
}

impl ScanCounters {
    pub(crate) fn record_file(&mut self, size: u64) {
        self.files_scanned += 1;
        self.bytes_total += size;
    }

    pub(crate) fn record_dir(&mut self) {
        self.dirs_scanned += 1;
    }
}

/// Progress updates emitted during scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScanProgress {
    /// Starting scan of a path
    Started { root: PathBuf },
    /// Periodic progress update
    Progress {
        files_scanned: u64,
        dirs_scanned: u64,
        bytes_total: u64,
        /// Directory being processed when the event was forced
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<PathBuf>,
    },
    /// Scan completed; always the last event of a scan
    Completed {
        files_scanned: u64,
        dirs_scanned: u64,
        bytes_total: u64,
        elapsed_ms: u64,
        hint: &'static str,
    },
}

impl ScanProgress {
    pub(crate) fn progress(counters: &ScanCounters, hint: Option<&Path>) -> Self {
        Self::Progress {
            files_scanned: counters.files_scanned,
            dirs_scanned: counters.dirs_scanned,
            bytes_total: counters.bytes_total,
            hint: hint.map(Path::to_path_buf),
        }
    }

    pub(crate) fn completed(counters: &ScanCounters, elapsed: Duration) -> Self {
        Self::Completed {
            files_scanned: counters.files_scanned,
            dirs_scanned: counters.dirs_scanned,
            bytes_total: counters.bytes_total,
            elapsed_ms: elapsed.as_millis() as u64,
            hint: DONE_HINT,
        }
    }

    /// Counter snapshot carried by the event, if any.
    pub fn counters(&self) -> Option<ScanCounters> {
        match *self {
            Self::Started { .. } => None,
            Self::Progress {
                files_scanned,
                dirs_scanned,
                bytes_total,
                ..
            }
            | Self::Completed {
                files_scanned,
                dirs_scanned,
                bytes_total,
                ..
            } => Some(ScanCounters {
                files_scanned,
                dirs_scanned,
                bytes_total,
            }),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
