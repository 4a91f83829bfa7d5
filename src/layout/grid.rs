use crate::foundation::core::Rect;

/// Largest row or column count the lookup can produce.
pub const MAX_GRID_DIM: u32 = 3;

/// Signature shared by every layout call site (live preview and final render).
pub type LayoutFn = fn(usize, f64, f64) -> GridLayout;

/// Cell geometry for one collage, in canvas coordinates.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GridLayout {
    /// Side of the square canvas the cells were computed for.
    pub canvas_side: f64,
    /// Gap between cells and around the border.
    pub spacing: f64,
    /// Grid rows.
    pub rows: u32,
    /// Grid columns.
    pub cols: u32,
    /// One rectangle per photo index, row-major.
    pub cells: Vec<Rect>,
}

impl GridLayout {
    /// Cell for photo `index`, if the layout has one.
    pub fn cell(&self, index: usize) -> Option<Rect> {
        self.cells.get(index).copied()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Return `true` when there are no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// `(rows, cols)` for a photo count. Counts outside 2..=9 fall back to a single cell.
pub fn grid_dimensions(count: usize) -> (u32, u32) {
    match count {
        2 => (1, 2),
        3 => (1, 3),
        4 => (2, 2),
        5 | 6 => (2, 3),
        7..=9 => (3, 3),
        _ => (1, 1),
    }
}

/// Lay out `count` cells on a `canvas_side` square with uniform `spacing` gaps.
///
/// Pure: the same inputs always give the same rectangles, so a preview and the saved render agree
/// cell for cell. Exactly `count` cells are returned; with the (1,1) fallback every index past the
/// first wraps into rows below the canvas, matching the row-major formula.
#[tracing::instrument(level = "trace")]
pub fn compute_layout(count: usize, canvas_side: f64, spacing: f64) -> GridLayout {
    let (rows, cols) = grid_dimensions(count);
    let cell_w = cell_extent(canvas_side, spacing, cols);
    let cell_h = cell_extent(canvas_side, spacing, rows);

    let cols_usize = cols as usize;
    let cells = (0..count)
        .map(|i| {
            let row = (i / cols_usize) as f64;
            let col = (i % cols_usize) as f64;
            let x = spacing + col * (cell_w + spacing);
            let y = spacing + row * (cell_h + spacing);
            Rect::new(x, y, x + cell_w, y + cell_h)
        })
        .collect();

    GridLayout {
        canvas_side,
        spacing,
        rows,
        cols,
        cells,
    }
}

fn cell_extent(canvas_side: f64, spacing: f64, n: u32) -> f64 {
    ((canvas_side - spacing * f64::from(n + 1)) / f64::from(n)).max(0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
