use serde::Serialize;

/// An item to place, weighted by its size.
#[derive(Debug, Clone, Copy)]
pub struct Weighted<T> {
    pub item: T,
    pub weight: u64,
}

/// A positioned rectangle in the treemap layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutRect<T> {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub item: T,
}

impl<T> LayoutRect<T> {
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Item with its target area inside the container.
struct Cell<T> {
    item: T,
    area: f64,
}

/// Part of the container not yet covered by closed rows.
struct Free {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// Squarified treemap (Bruls, Huizing, van Wijk).
///
/// Items are placed in the given order; callers pass them sorted largest
/// first. Zero-weight items are dropped. Rows grow while adding the next
/// item does not worsen the row's worst aspect ratio. Rectangles with a
/// non-finite or non-positive side are skipped, never emitted.
pub fn squarify<T: Clone>(items: &[Weighted<T>], x: f64, y: f64, w: f64, h: f64) -> Vec<LayoutRect<T>> {
    let mut result = Vec::with_capacity(items.len());
    if !(w > 0.0 && h > 0.0) {
        return result;
    }

    let total: f64 = items
        .iter()
        .filter(|it| it.weight > 0)
        .map(|it| it.weight as f64)
        .sum();
    if total <= 0.0 {
        return result;
    }

    let container = w * h;
    let cells: Vec<Cell<T>> = items
        .iter()
        .filter(|it| it.weight > 0)
        .map(|it| Cell {
            item: it.item.clone(),
            area: (it.weight as f64 / total) * container,
        })
        .collect();

    let mut free = Free { x, y, w, h };
    let mut horizontal = free.w >= free.h;
    let mut row_start = 0;

    for i in 0..cells.len() {
        let side = if horizontal { free.h } else { free.w };
        let grows = i == row_start
            || worst_aspect_ratio(&cells[row_start..=i], side)
                <= worst_aspect_ratio(&cells[row_start..i], side);
        if !grows {
            layout_row(&cells[row_start..i], horizontal, &mut free, &mut result);
            horizontal = free.w >= free.h;
            row_start = i;
        }
    }
    if row_start < cells.len() {
        layout_row(&cells[row_start..], horizontal, &mut free, &mut result);
    }

    result
}

/// Worst aspect ratio of a row laid against a side of length `side`.
fn worst_aspect_ratio<T>(row: &[Cell<T>], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|c| c.area).sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let max_a = row.iter().map(|c| c.area).fold(0.0, f64::max);
    let min_a = row.iter().map(|c| c.area).fold(f64::INFINITY, f64::min);
    if min_a <= 0.0 {
        return f64::INFINITY;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    ((side_sq * max_a) / sum_sq).max(sum_sq / (side_sq * min_a))
}

/// Lay a closed row out as a strip and shrink the free area by its thickness.
/// Horizontal strips span the free width; vertical ones span the free height.
fn layout_row<T: Clone>(row: &[Cell<T>], horizontal: bool, free: &mut Free, out: &mut Vec<LayoutRect<T>>) {
    let sum: f64 = row.iter().map(|c| c.area).sum();
    if sum <= 0.0 {
        return;
    }

    let span = if horizontal { free.w } else { free.h };
    let thickness = sum / span;
    if !thickness.is_finite() || thickness <= 0.0 {
        tracing::warn!(
            "Squarify: invalid strip thickness {} (row area={}, span={}), skipping row",
            thickness,
            sum,
            span
        );
        return;
    }

    let mut offset = 0.0;
    for cell in row {
        let length = cell.area / thickness;
        if !length.is_finite() || length <= 0.0 {
            tracing::warn!(
                "Squarify: invalid length {} (area={}, thickness={}), skipping",
                length,
                cell.area,
                thickness
            );
            continue;
        }
        let rect = if horizontal {
            LayoutRect {
                x: free.x + offset,
                y: free.y,
                w: length,
                h: thickness,
                item: cell.item.clone(),
            }
        } else {
            LayoutRect {
                x: free.x,
                y: free.y + offset,
                w: thickness,
                h: length,
                item: cell.item.clone(),
            }
        };
        out.push(rect);
        offset += length;
    }

    if horizontal {
        free.y += thickness;
        free.h -= thickness;
    } else {
        free.x += thickness;
        free.w -= thickness;
    }
}
