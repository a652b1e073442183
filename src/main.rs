mod cli;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser as _;

use cli::{Cli, View};
use silvascan::app::App;
use silvascan::scanner::ScanProgress;
use silvascan::ui::format::format_size;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(cli.log_level.as_directive().parse()?),
        )
        .init();

    let mut app = App::new(cli.scan_request(), cli.treemap_config());
    app.viewport_width = cli.width;
    app.viewport_height = cli.height;

    app.start_scan();
    app.wait_for_scan(log_progress)?;

    if let Some(zoom) = &cli.zoom {
        if app.zoom_to(zoom) {
            tracing::debug!("Zoomed to {} (depth {})", zoom.display(), app.navigation.depth());
        } else {
            tracing::warn!("{} is not a directory in the scanned tree, showing root", zoom.display());
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = match cli.view {
        View::Children => print_children(&app, cli.json, &mut out),
        View::Folders => print_folders(&app, cli.json, &mut out),
        View::Treemap => print_treemap(&app, cli.json, &mut out),
    };
    written.context("failed to write report")?;
    out.flush()?;
    Ok(())
}

fn log_progress(event: &ScanProgress) {
    match event {
        ScanProgress::Started { root } => tracing::info!("Scanning {}", root.display()),
        ScanProgress::Progress {
            files_scanned,
            dirs_scanned,
            bytes_total,
            hint,
        } => tracing::debug!(
            "files {} · dirs {} · {}{}",
            files_scanned,
            dirs_scanned,
            format_size(*bytes_total),
            hint.as_ref()
                .map(|h| format!(" · {}", h.display()))
                .unwrap_or_default()
        ),
        ScanProgress::Completed {
            files_scanned,
            dirs_scanned,
            bytes_total,
            elapsed_ms,
            ..
        } => tracing::info!(
            "Done: files {} · dirs {} · {} in {} ms",
            files_scanned,
            dirs_scanned,
            format_size(*bytes_total),
            elapsed_ms
        ),
    }
}

fn print_children(app: &App, json: bool, out: &mut impl Write) -> Result<()> {
    let Some(node) = app.focused() else {
        return Ok(());
    };
    if json {
        serde_json::to_writer_pretty(&mut *out, node).context("failed to serialize tree")?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}  {}", node.path.display(), format_size(node.size))?;
    for row in node.top_level() {
        let bar_len = (row.fraction * 30.0).round() as usize;
        writeln!(
            out,
            "{} {:<40} {:<30} {:>10}",
            if row.node.is_dir { "[D]" } else { "[F]" },
            row.node.name,
            "#".repeat(bar_len.max(1)),
            format_size(row.node.size)
        )?;
    }
    Ok(())
}

fn print_folders(app: &App, json: bool, out: &mut impl Write) -> Result<()> {
    let Some(node) = app.focused() else {
        return Ok(());
    };
    let folders = node.folders();
    if json {
        let rows: Vec<_> = folders
            .iter()
            .map(|f| serde_json::json!({ "path": f.path, "size": f.size }))
            .collect();
        serde_json::to_writer_pretty(&mut *out, &rows).context("failed to serialize folders")?;
        writeln!(out)?;
        return Ok(());
    }
    for folder in folders {
        writeln!(out, "[D] {:>10}  {}", format_size(folder.size), folder.path.display())?;
    }
    Ok(())
}

fn print_treemap(app: &App, json: bool, out: &mut impl Write) -> Result<()> {
    let rects = app.layout();
    if json {
        serde_json::to_writer_pretty(&mut *out, &rects).context("failed to serialize layout")?;
        writeln!(out)?;
        return Ok(());
    }
    for r in &rects {
        writeln!(
            out,
            "{:>9.1} {:>9.1} {:>9.1} {:>9.1}  {} {} ({})",
            r.x,
            r.y,
            r.w,
            r.h,
            if r.item.is_dir { "[D]" } else { "[F]" },
            r.item.name,
            format_size(r.item.size)
        )?;
    }
    Ok(())
}
