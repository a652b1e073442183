use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::thread::JoinHandle;

use anyhow::{anyhow, Result};

use crate::layout::{self, LayoutRect, TreemapConfig};
use crate::scanner::{self, ProgressConfig, ScanProgress, ScanRequest};
use crate::tree::TreeNode;
use crate::ui::input::{self, Activation, InputAction};
use crate::ui::ZoomNavigator;

/// Application state machine phases.
#[derive(Debug, PartialEq, Eq)]
pub enum AppPhase {
    /// No scan requested yet
    WaitingForPath,
    /// Scanning the filesystem
    Scanning,
    /// Ready to render the treemap
    Ready,
}

/// Top-level application state.
pub struct App {
    pub phase: AppPhase,
    pub request: ScanRequest,

    // Scan state
    pub scan_progress: Option<ScanProgress>,
    progress_config: ProgressConfig,
    scan_rx: Option<mpsc::Receiver<ScanProgress>>,
    scan_handle: Option<JoinHandle<TreeNode>>,

    // Data
    pub tree: Option<TreeNode>,
    pub treemap_config: TreemapConfig,

    // UI state
    pub navigation: ZoomNavigator,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl App {
    pub fn new(request: ScanRequest, treemap_config: TreemapConfig) -> Self {
        Self {
            phase: AppPhase::WaitingForPath,
            request,
            scan_progress: None,
            progress_config: ProgressConfig::default(),
            scan_rx: None,
            scan_handle: None,
            tree: None,
            treemap_config,
            navigation: ZoomNavigator::new(),
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }

    /// Start scanning the filesystem in a background thread.
    pub fn start_scan(&mut self) {
        self.phase = AppPhase::Scanning;
        self.scan_progress = None;
        let (handle, rx) = scanner::spawn_scan(self.request.clone(), self.progress_config);
        self.scan_handle = Some(handle);
        self.scan_rx = Some(rx);
    }

    /// Block until the running scan finishes, handing every progress event
    /// to `on_progress` as it arrives.
    pub fn wait_for_scan(&mut self, mut on_progress: impl FnMut(&ScanProgress)) -> Result<()> {
        if let Some(rx) = self.scan_rx.take() {
            for event in rx.iter() {
                on_progress(&event);
                self.scan_progress = Some(event);
            }
        }
        self.finish_scan()
    }

    /// Poll for scan completion without blocking.
    /// Returns true once a new tree has been installed.
    pub fn poll_scan(&mut self) -> Result<bool> {
        let Some(rx) = &self.scan_rx else {
            return Ok(false);
        };
        let mut done = false;
        // Drain all available messages
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    done |= event.is_done();
                    self.scan_progress = Some(event);
                }
                Err(TryRecvError::Empty) => break,
                // Sender gone without `Completed`: the thread died, join reports it
                Err(TryRecvError::Disconnected) => {
                    done = true;
                    break;
                }
            }
        }
        if !done {
            return Ok(false);
        }
        self.scan_rx = None;
        self.finish_scan()?;
        Ok(true)
    }

    fn finish_scan(&mut self) -> Result<()> {
        let Some(handle) = self.scan_handle.take() else {
            return Ok(());
        };
        let tree = match handle.join() {
            Ok(tree) => tree,
            Err(_) => {
                self.phase = if self.tree.is_some() {
                    AppPhase::Ready
                } else {
                    AppPhase::WaitingForPath
                };
                return Err(anyhow!("scan thread panicked"));
            }
        };
        tracing::info!(
            "Tree ready: '{}' ({} bytes, {} entries materialized)",
            tree.name,
            tree.size,
            tree.materialized_count()
        );
        self.tree = Some(tree);
        self.navigation.on_scan_complete();
        self.phase = AppPhase::Ready;
        Ok(())
    }

    /// Node currently displayed (scan root unless zoomed).
    pub fn focused(&self) -> Option<&TreeNode> {
        self.tree.as_ref().map(|tree| self.navigation.focused(tree))
    }

    /// Rectangles for the current frame.
    pub fn layout(&self) -> Vec<LayoutRect<&TreeNode>> {
        match self.focused() {
            Some(node) => layout::compute_layout(
                node,
                self.viewport_width,
                self.viewport_height,
                &self.treemap_config,
            ),
            None => Vec::new(),
        }
    }

    /// Zoom by path without going through the frame.
    pub fn zoom_to(&mut self, path: &Path) -> bool {
        match &self.tree {
            Some(tree) => self.navigation.zoom_into(tree, path),
            None => false,
        }
    }

    /// Apply a click on the current frame; a double click starts a rescan.
    pub fn click(&mut self, x: f64, y: f64, activation: Activation) -> InputAction {
        let Some(tree) = &self.tree else {
            return InputAction::None;
        };
        let focused = self.navigation.focused(tree);
        let rects = layout::compute_layout(
            focused,
            self.viewport_width,
            self.viewport_height,
            &self.treemap_config,
        );
        let action = input::activate(
            &rects,
            x,
            y,
            activation,
            tree,
            &mut self.navigation,
            &self.request,
        );
        if let InputAction::Rescan(next) = &action {
            if self.phase == AppPhase::Scanning {
                tracing::debug!("Scan in progress, ignoring rescan of {}", next.root.display());
                return InputAction::None;
            }
            tracing::info!("Re-rooting scan at {}", next.root.display());
            self.request = next.clone();
            self.start_scan();
        }
        action
    }
}
