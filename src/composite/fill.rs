use crate::foundation::core::{Rect, Size};

/// Rectangle that draws an `image`-sized source over `cell` with aspect-fill.
///
/// The result fully covers `cell` and is centered on it; whatever sticks out past the cell along
/// one axis must be clipped by the caller. Degenerate sizes fall back to `cell` itself.
pub fn aspect_fill_rect(image: Size, cell: Rect) -> Rect {
    let (cw, ch) = (cell.width(), cell.height());
    if image.width <= 0.0 || image.height <= 0.0 || cw <= 0.0 || ch <= 0.0 {
        return cell;
    }

    let image_aspect = image.width / image.height;
    let cell_aspect = cw / ch;

    if image_aspect > cell_aspect {
        let draw_h = ch;
        let draw_w = draw_h * image_aspect;
        let x0 = cell.x0 - (draw_w - cw) / 2.0;
        Rect::new(x0, cell.y0, x0 + draw_w, cell.y0 + draw_h)
    } else {
        let draw_w = cw;
        let draw_h = draw_w / image_aspect;
        let y0 = cell.y0 - (draw_h - ch) / 2.0;
        Rect::new(cell.x0, y0, cell.x0 + draw_w, y0 + draw_h)
    }
}
