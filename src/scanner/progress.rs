use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::types::{ScanCounters, ScanProgress};

/// Minimum gap between two unforced progress events.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// Destination for progress events. Implementations must not block the walker.
pub trait ProgressSink {
    fn emit(&mut self, event: ScanProgress);
}

/// Fire-and-forget: a dropped receiver is ignored.
impl ProgressSink for mpsc::Sender<ScanProgress> {
    fn emit(&mut self, event: ScanProgress) {
        let _ = self.send(event);
    }
}

/// Bounded queue: events that do not fit are dropped instead of waiting.
impl ProgressSink for mpsc::SyncSender<ScanProgress> {
    fn emit(&mut self, event: ScanProgress) {
        if let Err(mpsc::TrySendError::Full(dropped)) = self.try_send(event) {
            tracing::trace!("progress queue full, dropping {:?}", dropped);
        }
    }
}

impl ProgressSink for Vec<ScanProgress> {
    fn emit(&mut self, event: ScanProgress) {
        self.push(event);
    }
}

/// Sink that throws every event away.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl ProgressSink for Discard {
    fn emit(&mut self, _event: ScanProgress) {}
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressConfig {
    pub interval: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Rate-limited wrapper that turns raw counters into progress events.
///
/// Unhinted reports are coalesced to one per `interval`. A report carrying a
/// hint is always emitted, and so is the terminal event from `finish`.
pub struct ProgressReporter<S> {
    sink: S,
    config: ProgressConfig,
    started: Instant,
    last_emit: Instant,
}

impl<S: ProgressSink> ProgressReporter<S> {
    pub fn new(sink: S, config: ProgressConfig) -> Self {
        let now = Instant::now();
        Self {
            sink,
            config,
            started: now,
            last_emit: now,
        }
    }

    pub(crate) fn started(&mut self, root: &Path) {
        let now = Instant::now();
        self.started = now;
        self.last_emit = now;
        self.sink.emit(ScanProgress::Started {
            root: root.to_path_buf(),
        });
    }

    pub fn report(&mut self, counters: &ScanCounters, hint: Option<&Path>) {
        let now = Instant::now();
        if hint.is_none() && now.duration_since(self.last_emit) < self.config.interval {
            return;
        }
        self.last_emit = now;
        self.sink.emit(ScanProgress::progress(counters, hint));
    }

    pub(crate) fn finish(&mut self, counters: &ScanCounters) -> Duration {
        let elapsed = self.started.elapsed();
        self.last_emit = Instant::now();
        self.sink.emit(ScanProgress::completed(counters, elapsed));
        elapsed
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
