pub mod probe;
pub mod progress;
pub mod types;
pub mod walk;

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

pub use self::progress::{ProgressConfig, ProgressReporter, ProgressSink};
pub use self::types::{ScanCounters, ScanProgress, ScanRequest};
pub use self::walk::{scan, scan_with_progress};

use crate::tree::TreeNode;

/// Run a scan on a background thread.
///
/// Progress arrives on the returned receiver, ending with the `Completed`
/// event; the tree is delivered once through the join handle.
pub fn spawn_scan(
    request: ScanRequest,
    config: ProgressConfig,
) -> (JoinHandle<TreeNode>, mpsc::Receiver<ScanProgress>) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let mut reporter = ProgressReporter::new(tx, config);
        scan_with_progress(&request, &mut reporter)
    });
    (handle, rx)
}
