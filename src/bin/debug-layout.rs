/// Diagnostic tool to verify the scan → tree → layout pipeline
use silvascan::layout::{compute_layout, ItemKind, LayoutRect, TreemapConfig};
use silvascan::scanner::{self, ScanRequest};
use silvascan::tree::aggregate::is_size_sorted;
use silvascan::tree::TreeNode;
use silvascan::ui::format::format_size;
use std::path::PathBuf;

const WIDTH: f64 = 1920.0;
const HEIGHT: f64 = 1080.0;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("silvascan=debug".parse()?),
        )
        .init();

    let scan_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let max_entries = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(scanner::types::MAX_ENTRIES_LIMIT);

    println!("=== DIAGNOSTIC: Tree → Layout Pipeline ===");
    println!("Scanning: {} (max_entries={})", scan_path.display(), max_entries);

    // Scan
    let request = ScanRequest::new(&scan_path).with_max_entries(max_entries);
    let start = std::time::Instant::now();
    let tree = scanner::scan(&request);
    println!(
        "\n[1] Scan completed in {:.2}s: {} nodes materialized",
        start.elapsed().as_secs_f64(),
        tree.materialized_count()
    );
    println!(
        "    Root: '{}' (size={}, is_dir={})",
        tree.name,
        format_size(tree.size),
        tree.is_dir
    );

    // Tree invariants
    println!("\n[2] Tree invariants:");
    println!("    Sorted children:     {}", ok(is_size_sorted(&tree)));
    println!(
        "    Within budget:       {}",
        ok(tree.materialized_count() <= request.effective_budget())
    );
    let shortfall = kept_shortfall(&tree);
    println!(
        "    Bytes not in children (budget/filter): {}",
        format_size(shortfall)
    );

    // Top 10 children
    println!("\n[3] Top 10 children of root:");
    for (i, child) in tree.children.iter().take(10).enumerate() {
        println!(
            "    [{}] '{}' - {} (dir={}, children={})",
            i,
            child.name,
            format_size(child.size),
            child.is_dir,
            child.children.len()
        );
    }

    // Layout both sibling kinds
    for kind in [ItemKind::Files, ItemKind::Directories] {
        let config = TreemapConfig {
            kind,
            ..TreemapConfig::default()
        };
        let rects = compute_layout(&tree, WIDTH, HEIGHT, &config);
        println!("\n[4] Layout ({:?}): {} rectangles", kind, rects.len());
        report_anomalies(&rects);
    }

    Ok(())
}

fn ok(pass: bool) -> &'static str {
    if pass {
        "ok"
    } else {
        "FAILED"
    }
}

/// Bytes counted in directory totals but not visible through kept children.
fn kept_shortfall(node: &TreeNode) -> u64 {
    if !node.is_dir {
        return 0;
    }
    let kept: u64 = node.children.iter().map(|c| c.size).sum();
    node.size.saturating_sub(kept) + node.children.iter().map(kept_shortfall).sum::<u64>()
}

fn report_anomalies(rects: &[LayoutRect<&TreeNode>]) {
    let area_sum: f64 = rects.iter().map(LayoutRect::area).sum();
    let viewport_area = WIDTH * HEIGHT;
    println!("    Total rect area: {:.0}px²", area_sum);
    println!("    Viewport area:   {:.0}px²", viewport_area);
    if !rects.is_empty() {
        println!("    Coverage: {:.3}%", (area_sum / viewport_area) * 100.0);
    }

    let worst = rects
        .iter()
        .map(|r| (r.w / r.h).max(r.h / r.w))
        .fold(0.0, f64::max);
    println!("    Worst aspect ratio: {:.2}", worst);

    let mut overlaps = 0;
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            let eps = 1e-6;
            if a.x + eps < b.x + b.w && b.x + eps < a.x + a.w && a.y + eps < b.y + b.h && b.y + eps < a.y + a.h {
                overlaps += 1;
            }
        }
    }
    println!("    Overlapping pairs: {}", overlaps);

    println!("    Top 5 rectangles:");
    for (i, r) in rects.iter().take(5).enumerate() {
        println!(
            "    [{}] '{}' - {:.1}x{:.1} at ({:.1}, {:.1}) - {}",
            i,
            r.item.name,
            r.w,
            r.h,
            r.x,
            r.y,
            format_size(r.item.size)
        );
    }
}
