use super::*;

const SIDE: f64 = 1080.0;
const SP: f64 = 4.0;
const EPS: f64 = 1e-9;

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 - EPS && b.x0 < a.x1 - EPS && a.y0 < b.y1 - EPS && b.y0 < a.y1 - EPS
}

#[test]
fn dimension_lookup() {
    assert_eq!(grid_dimensions(2), (1, 2));
    assert_eq!(grid_dimensions(3), (1, 3));
    assert_eq!(grid_dimensions(4), (2, 2));
    assert_eq!(grid_dimensions(5), (2, 3));
    assert_eq!(grid_dimensions(6), (2, 3));
    for c in 7..=9 {
        assert_eq!(grid_dimensions(c), (3, 3));
    }
    assert_eq!(grid_dimensions(0), (1, 1));
    assert_eq!(grid_dimensions(1), (1, 1));
    assert_eq!(grid_dimensions(10), (1, 1));
}

#[test]
fn every_supported_count_fits_without_overlap() {
    for count in 2..=9 {
        let layout = compute_layout(count, SIDE, SP);
        assert_eq!(layout.len(), count);

        for (i, r) in layout.cells.iter().enumerate() {
            assert!(r.x0 >= 0.0 && r.y0 >= 0.0, "count {count} cell {i}: {r:?}");
            assert!(r.x1 <= SIDE + EPS && r.y1 <= SIDE + EPS, "count {count} cell {i}: {r:?}");
            assert!(r.width() > 0.0 && r.height() > 0.0);
        }
        for i in 0..count {
            for j in (i + 1)..count {
                assert!(
                    !overlaps(layout.cells[i], layout.cells[j]),
                    "count {count}: cells {i} and {j} overlap"
                );
            }
        }
    }
}

#[test]
fn gaps_are_uniform() {
    for count in 2..=9 {
        let layout = compute_layout(count, SIDE, SP);
        let cols = layout.cols as usize;
        for (i, r) in layout.cells.iter().enumerate() {
            let col = i % cols;
            let row = i / cols;
            if col == 0 {
                assert!((r.x0 - SP).abs() < EPS);
            } else {
                let left = layout.cells[i - 1];
                assert!((r.x0 - left.x1 - SP).abs() < EPS);
            }
            if row == 0 {
                assert!((r.y0 - SP).abs() < EPS);
            } else {
                let above = layout.cells[i - cols];
                assert!((r.y0 - above.y1 - SP).abs() < EPS);
            }
        }
        // A full last row/column reaches exactly one gap from the far edge.
        let last_col = layout.cells[cols - 1];
        assert!((SIDE - last_col.x1 - SP).abs() < EPS);
    }
}

#[test]
fn four_photos_make_equal_quadrants() {
    let layout = compute_layout(4, SIDE, SP);
    assert_eq!((layout.rows, layout.cols), (2, 2));
    let w = (SIDE - SP * 3.0) / 2.0;
    for r in &layout.cells {
        assert!((r.width() - w).abs() < EPS);
        assert!((r.height() - w).abs() < EPS);
    }
    assert_eq!(layout.cells[3].origin(), kurbo::Point::new(SP * 2.0 + w, SP * 2.0 + w));
}

#[test]
fn seven_photos_leave_the_tail_of_the_grid_empty() {
    let layout = compute_layout(7, SIDE, SP);
    assert_eq!(layout.len(), 7);
    // Index 6 starts the third row.
    assert!((layout.cells[6].x0 - SP).abs() < EPS);
    assert!(layout.cells[6].y0 > layout.cells[3].y1);
}

#[test]
fn layout_is_pure() {
    for count in 0..=12 {
        assert_eq!(
            compute_layout(count, 640.0, 2.0),
            compute_layout(count, 640.0, 2.0)
        );
    }
}

#[test]
fn preview_and_render_share_proportions() {
    let preview = compute_layout(5, 300.0, 0.0);
    let render = compute_layout(5, 1080.0, 0.0);
    let k = 1080.0 / 300.0;
    for (p, r) in preview.cells.iter().zip(render.cells.iter()) {
        assert!((p.x0 * k - r.x0).abs() < 1e-6);
        assert!((p.width() * k - r.width()).abs() < 1e-6);
    }
}
