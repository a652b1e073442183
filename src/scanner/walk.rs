use std::collections::BTreeMap;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

use super::probe::probe;
use super::progress::{Discard, ProgressConfig, ProgressReporter, ProgressSink};
use super::types::{ScanCounters, ScanRequest};
use crate::tree::TreeNode;

/// Mutable state of one walk. Every step receives it by `&mut`, so the
/// budget is a single counter shared by the whole tree, not per directory.
struct WalkContext {
    counters: ScanCounters,
    /// Child slots left for materialization
    budget: usize,
    min_size_bytes: u64,
}

impl WalkContext {
    fn new(request: &ScanRequest) -> Self {
        Self {
            counters: ScanCounters::default(),
            budget: request.effective_budget(),
            min_size_bytes: request.min_size_bytes,
        }
    }

    fn take_slot(&mut self) -> bool {
        if self.budget == 0 {
            return false;
        }
        self.budget -= 1;
        true
    }
}

/// A directory whose children are still being visited.
struct DirFrame {
    path: PathBuf,
    entries: std::vec::IntoIter<DirEntry>,
    total: u64,
    /// Discovery index handed to the next child
    seq: u64,
    dirs: Vec<(u64, TreeNode)>,
    /// Kept files keyed by (size, discovery index), smallest first
    files: BTreeMap<(u64, u64), TreeNode>,
}

impl DirFrame {
    fn open(path: &Path, entries: Vec<DirEntry>) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: entries.into_iter(),
            total: 0,
            seq: 0,
            dirs: Vec::new(),
            files: BTreeMap::new(),
        }
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    fn close(self) -> TreeNode {
        let mut kept = self.dirs;
        kept.extend(self.files.into_iter().map(|((_, seq), node)| (seq, node)));
        kept.sort_unstable_by_key(|(seq, _)| *seq);
        let children = kept.into_iter().map(|(_, node)| node).collect();
        TreeNode::directory(&self.path, self.total, children)
    }

    /// Fold a finished subdirectory into this one.
    fn adopt_dir(&mut self, child: TreeNode, ctx: &mut WalkContext) {
        let seq = self.next_seq();
        self.total += child.size;
        ctx.counters.record_dir();
        if ctx.take_slot() {
            self.dirs.push((seq, child));
        }
    }

    fn adopt_file(&mut self, path: &Path, ctx: &mut WalkContext) {
        let seq = self.next_seq();
        let size = probe(path).size;
        self.total += size;
        ctx.counters.record_file(size);
        if size < ctx.min_size_bytes {
            return;
        }
        if ctx.take_slot() {
            self.files.insert((size, seq), TreeNode::leaf(path, size));
            return;
        }
        // Out of slots: a strictly larger file takes over the slot of the
        // smallest file kept in this directory.
        if let Some(smallest) = self.files.first_entry() {
            if smallest.key().0 < size {
                smallest.remove();
                self.files.insert((size, seq), TreeNode::leaf(path, size));
            }
        }
    }
}

enum Entered {
    Leaf(TreeNode),
    Dir(DirFrame),
}

/// Probe `path` and either finish it as a leaf or open it for traversal.
fn enter(path: &Path, ctx: &mut WalkContext) -> Entered {
    let info = probe(path);
    if !info.exists {
        return Entered::Leaf(TreeNode::leaf(path, 0));
    }
    if !info.is_dir {
        ctx.counters.record_file(info.size);
        return Entered::Leaf(TreeNode::leaf(path, info.size));
    }

    let entries = match fs::read_dir(path) {
        Ok(read_dir) => read_dir
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!("skipping entry in {}: {}", path.display(), err);
                    None
                }
            })
            .collect::<Vec<_>>(),
        Err(err) => {
            tracing::debug!("cannot list {}: {}", path.display(), err);
            Vec::new()
        }
    };

    Entered::Dir(DirFrame::open(path, entries))
}

/// Depth-first, post-order walk driven by an explicit stack so deep
/// hierarchies cannot exhaust the native stack. A subdirectory is fully
/// aggregated before its parent moves on to the next sibling.
fn walk<S: ProgressSink>(
    root: &Path,
    ctx: &mut WalkContext,
    reporter: &mut ProgressReporter<S>,
) -> TreeNode {
    let mut stack = match enter(root, ctx) {
        Entered::Leaf(node) => return node,
        Entered::Dir(frame) => vec![frame],
    };
    let mut finished = None;

    while let Some(frame) = stack.last_mut() {
        match frame.entries.next() {
            Some(entry) => {
                let path = entry.path();
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir {
                    frame.adopt_file(&path, ctx);
                    reporter.report(&ctx.counters, Some(&frame.path));
                    continue;
                }
                match enter(&path, ctx) {
                    Entered::Dir(child) => stack.push(child),
                    Entered::Leaf(node) => {
                        frame.adopt_dir(node, ctx);
                        reporter.report(&ctx.counters, Some(&frame.path));
                    }
                }
            }
            None => {
                let Some(done) = stack.pop() else { break };
                let node = done.close();
                match stack.last_mut() {
                    Some(parent) => {
                        parent.adopt_dir(node, ctx);
                        reporter.report(&ctx.counters, Some(&parent.path));
                    }
                    None => finished = Some(node),
                }
            }
        }
    }

    finished.unwrap_or_else(|| TreeNode::directory(root, 0, Vec::new()))
}

/// Scan `request.root` and return the aggregated tree, discarding progress.
///
/// Entries claim `max_entries` slots in discovery order. Once no slot is left,
/// a file larger than the smallest file kept in the same directory replaces it,
/// so the kept count never grows past the budget.
pub fn scan(request: &ScanRequest) -> TreeNode {
    let mut reporter = ProgressReporter::new(Discard, ProgressConfig::default());
    scan_with_progress(request, &mut reporter)
}

/// Scan `request.root`, streaming throttled progress through `reporter`.
///
/// Always returns a tree: unreadable entries contribute zero bytes, and a
/// missing root yields a single zero-size node. The reporter receives one
/// `Started` event, zero or more `Progress` events and exactly one
/// `Completed` event.
pub fn scan_with_progress<S: ProgressSink>(
    request: &ScanRequest,
    reporter: &mut ProgressReporter<S>,
) -> TreeNode {
    let root = request.root.as_path();
    tracing::info!(
        "Scanning {} (max_entries={}, min_size_bytes={})",
        root.display(),
        request.effective_budget(),
        request.min_size_bytes
    );

    reporter.started(root);
    let mut ctx = WalkContext::new(request);
    let tree = walk(root, &mut ctx, reporter);
    let elapsed = reporter.finish(&ctx.counters);

    tracing::info!(
        "Scan of {} finished in {:.2}s: {} files, {} dirs, {} bytes, {} entries kept",
        root.display(),
        elapsed.as_secs_f64(),
        ctx.counters.files_scanned,
        ctx.counters.dirs_scanned,
        ctx.counters.bytes_total,
        request.effective_budget() - ctx.budget
    );
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::types::ScanProgress;
    use crate::tree::aggregate::is_size_sorted;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, len: usize) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; len]).unwrap();
    }

    /// Sum of every file on disk below `dir`, computed independently.
    fn disk_total(dir: &Path) -> u64 {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap())
            .map(|e| {
                let ft = e.file_type().unwrap();
                if ft.is_dir() {
                    disk_total(&e.path())
                } else {
                    e.metadata().unwrap().len()
                }
            })
            .sum()
    }

    fn assert_totals_match_disk(node: &TreeNode) {
        if node.is_dir {
            assert_eq!(node.size, disk_total(&node.path), "{}", node.path.display());
            node.children.iter().for_each(assert_totals_match_disk);
        } else {
            assert!(node.children.is_empty());
        }
    }

    fn nested_fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/one.bin", 1000);
        write(dir.path(), "a/two.bin", 10);
        write(dir.path(), "a/deep/er/three.bin", 700);
        write(dir.path(), "a/deep/four.bin", 5);
        write(dir.path(), "b/five.bin", 333);
        write(dir.path(), "six.bin", 42);
        write(dir.path(), "seven.bin", 2048);
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        dir
    }

    #[test]
    fn flat_directory_sorted_by_size() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "small", 100);
        write(dir.path(), "large", 300);
        write(dir.path(), "medium", 200);

        let tree = scan(&ScanRequest::new(dir.path()));
        assert!(tree.is_dir);
        assert_eq!(tree.size, 600);
        let sizes: Vec<_> = tree.children.iter().map(|c| c.size).collect();
        assert_eq!(sizes, [300, 200, 100]);
        assert!(tree.children.iter().all(|c| !c.is_dir));
    }

    #[test]
    fn subdirectory_aggregates_into_parent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "A/x", 50);
        write(dir.path(), "A/y", 50);
        write(dir.path(), "B", 250);

        let tree = scan(&ScanRequest::new(dir.path()));
        assert_eq!(tree.size, 350);
        let names: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        assert!(tree.children[1].is_dir);
        assert_eq!(tree.children[1].size, 100);
    }

    #[test]
    fn budget_of_one_keeps_the_largest_file_only() {
        let dir = TempDir::new().unwrap();
        for (i, len) in [10, 40, 30, 20, 50].iter().enumerate() {
            write(dir.path(), &format!("f{i}"), *len);
        }

        let tree = scan(&ScanRequest::new(dir.path()).with_max_entries(1));
        assert_eq!(tree.size, 150);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].size, 50);
    }

    #[test]
    fn size_filter_hides_files_but_not_their_bytes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a", 10);
        write(dir.path(), "b", 20);
        write(dir.path(), "c", 30);

        let tree = scan(&ScanRequest::new(dir.path()).with_min_size_bytes(1_000));
        assert!(tree.children.is_empty());
        assert_eq!(tree.size, 60);
    }

    #[test]
    fn totals_survive_tiny_budget_and_high_filter() {
        let dir = nested_fixture();
        let request = ScanRequest::new(dir.path())
            .with_max_entries(2)
            .with_min_size_bytes(1_000_000);
        let tree = scan(&request);

        assert_eq!(tree.size, 1000 + 10 + 700 + 5 + 333 + 42 + 2048);
        assert_totals_match_disk(&tree);
        assert!(tree.materialized_count() <= 2);
        assert!(tree.children.len() <= 2);
    }

    #[test]
    fn tree_invariants_hold_for_every_budget() {
        let dir = nested_fixture();
        for budget in [1, 2, 3, 5, 8, 13, 1000] {
            let request = ScanRequest::new(dir.path())
                .with_max_entries(budget)
                .with_min_size_bytes(40);
            let tree = scan(&request);

            assert_totals_match_disk(&tree);
            assert!(is_size_sorted(&tree));
            assert!(tree.materialized_count() <= budget);

            let mut stack = vec![&tree];
            while let Some(node) = stack.pop() {
                for child in &node.children {
                    assert!(child.is_dir || child.size >= 40, "{:?}", child.path);
                }
                stack.extend(node.children.iter());
            }
        }
    }

    #[test]
    fn unlimited_budget_materializes_everything() {
        let dir = nested_fixture();
        let tree = scan(&ScanRequest::new(dir.path()));
        // 5 directories (a, a/deep, a/deep/er, b, empty) + 7 files
        assert_eq!(tree.materialized_count(), 12);
        let empty = tree.find(&dir.path().join("empty")).unwrap();
        assert!(empty.is_dir);
        assert_eq!(empty.size, 0);
    }

    #[test]
    fn single_file_root_is_a_leaf() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "only.bin", 77);

        let mut reporter = ProgressReporter::new(Vec::new(), ProgressConfig::default());
        let tree = scan_with_progress(&ScanRequest::new(dir.path().join("only.bin")), &mut reporter);
        assert!(!tree.is_dir);
        assert_eq!(tree.size, 77);
        assert!(tree.children.is_empty());

        let events = reporter.into_sink();
        let last = events.last().unwrap();
        assert!(last.is_done());
        assert_eq!(last.counters().unwrap().files_scanned, 1);
    }

    #[test]
    fn missing_root_yields_zero_size_node() {
        let dir = TempDir::new().unwrap();
        let tree = scan(&ScanRequest::new(dir.path().join("does-not-exist")));
        assert_eq!(tree.size, 0);
        assert!(!tree.is_dir);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn progress_counts_and_terminates_with_done() {
        let dir = nested_fixture();
        let mut reporter = ProgressReporter::new(
            Vec::new(),
            ProgressConfig {
                interval: Duration::from_secs(3600),
            },
        );
        scan_with_progress(&ScanRequest::new(dir.path()), &mut reporter);
        let events = reporter.into_sink();

        assert!(matches!(events.first(), Some(ScanProgress::Started { .. })));
        assert_eq!(events.iter().filter(|e| e.is_done()).count(), 1);
        assert!(events.last().unwrap().is_done());

        let done = events.last().unwrap().counters().unwrap();
        assert_eq!(done.files_scanned, 7);
        assert_eq!(done.dirs_scanned, 5);
        assert_eq!(done.bytes_total, disk_total(dir.path()));

        // Counters never go backwards.
        let files: Vec<_> = events.iter().filter_map(|e| e.counters()).map(|c| c.files_scanned).collect();
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
        // Every directory that had children announced itself at least once.
        let hinted = events
            .iter()
            .filter(|e| matches!(e, ScanProgress::Progress { hint: Some(_), .. }))
            .count();
        assert!(hinted >= 4);
    }

    #[test]
    fn flat_directory_reports_once_per_child() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("f{i}"), 10 + i);
        }
        let mut reporter = ProgressReporter::new(
            Vec::new(),
            ProgressConfig {
                interval: Duration::from_secs(3600),
            },
        );
        scan_with_progress(&ScanRequest::new(dir.path()), &mut reporter);

        let hints: Vec<_> = reporter
            .into_sink()
            .into_iter()
            .filter_map(|e| match e {
                ScanProgress::Progress { hint, .. } => hint,
                _ => None,
            })
            .collect();
        assert_eq!(hints.len(), 5);
        assert!(hints.iter().all(|h| h == dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_contributes_nothing() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "visible.bin", 64);
        write(dir.path(), "locked/secret.bin", 4096);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to observe there.
        let readable = fs::read_dir(&locked).is_ok();
        let tree = scan(&ScanRequest::new(dir.path()));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert_eq!(tree.size, 64);
            let locked_node = tree.find(&locked).unwrap();
            assert!(locked_node.is_dir);
            assert_eq!(locked_node.size, 0);
        }
    }
}
