use super::*;
use crate::catalog::source::DecodedImage;
use crate::foundation::core::AssetId;
use crate::layout::grid::compute_layout;
use crate::store::sink::MemoryPhotoStore;

const BG: Rgba8 = [0, 0, 0, 255];
const RED: Rgba8 = [255, 0, 0, 255];
const GREEN: Rgba8 = [0, 255, 0, 255];
const BLUE: Rgba8 = [0, 0, 255, 255];
const WHITE: Rgba8 = [255, 255, 255, 255];

fn request(ids: &[&str]) -> CollageRequest {
    CollageRequest::new(ids.iter().map(|s| AssetId::new(*s)).collect()).unwrap()
}

fn solid(w: u32, h: u32, c: Rgba8) -> DecodedImage {
    DecodedImage::new(RgbaImage::from_pixel(w, h, Rgba(c)))
}

fn px(img: &RgbaImage, x: u32, y: u32) -> Rgba8 {
    img.get_pixel(x, y).0
}

fn close(a: Rgba8, b: Rgba8) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
}

#[test]
fn four_cells_filled_with_their_own_image() {
    let req = request(&["a", "b", "c", "d"]);
    let mut cache = ImageCache::new();
    cache.insert(AssetId::new("a"), solid(40, 30, RED));
    cache.insert(AssetId::new("b"), solid(30, 40, GREEN));
    cache.insert(AssetId::new("c"), solid(10, 10, BLUE));
    cache.insert(AssetId::new("d"), solid(300, 200, WHITE));
    let layout = compute_layout(4, 200.0, 4.0);

    let collage = render(&req, &cache, &layout, 200, BG).unwrap();
    assert_eq!(collage.image.dimensions(), (200, 200));
    assert_eq!(collage.filled, vec![true; 4]);

    for (cell, want) in layout.cells.iter().zip([RED, GREEN, BLUE, WHITE]) {
        let c = cell.center();
        assert!(close(px(&collage.image, c.x as u32, c.y as u32), want));
        // Corners of the cell are covered too (no letterboxing).
        assert!(close(px(&collage.image, cell.x0 as u32 + 1, cell.y0 as u32 + 1), want));
        assert!(close(px(&collage.image, cell.x1 as u32 - 2, cell.y1 as u32 - 2), want));
    }
    // Outer border and the central gap keep the background.
    assert_eq!(px(&collage.image, 1, 1), BG);
    assert_eq!(px(&collage.image, 100, 50), BG);
    assert_eq!(px(&collage.image, 199, 199), BG);
}

#[test]
fn fractional_cells_are_fully_covered() {
    // 1001 / 3x3 with 4-unit gaps puts every inner cell edge between pixels.
    let ids = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
    let req = request(&ids);
    let mut cache = ImageCache::new();
    for id in ids {
        cache.insert(AssetId::new(id), solid(100, 100, WHITE));
    }
    let layout = compute_layout(9, 1001.0, 4.0);
    assert!(layout.cells.iter().any(|c| c.x1.fract() != 0.0));

    let collage = render(&req, &cache, &layout, 1001, BG).unwrap();
    assert_eq!(collage.filled, vec![true; 9]);
    for (i, cell) in layout.cells.iter().enumerate() {
        for y in cell.y0.round() as u32..cell.y1.round() as u32 {
            for x in cell.x0.round() as u32..cell.x1.round() as u32 {
                assert!(
                    close(px(&collage.image, x, y), WHITE),
                    "cell {i} uncovered at ({x},{y})"
                );
            }
        }
    }
}

#[test]
fn missing_images_leave_background_cells() {
    let req = request(&["a", "b", "c"]);
    let mut cache = ImageCache::new();
    cache.insert(AssetId::new("a"), solid(8, 8, RED));
    cache.insert(AssetId::new("c"), solid(8, 8, GREEN));
    let layout = compute_layout(3, 90.0, 0.0);

    let collage = render(&req, &cache, &layout, 90, BG).unwrap();
    assert_eq!(collage.filled, vec![true, false, true]);
    assert_eq!(collage.filled_cells(), 2);
    assert_eq!(px(&collage.image, 45, 45), BG);
    assert!(close(px(&collage.image, 15, 45), RED));
    assert!(close(px(&collage.image, 75, 45), GREEN));
}

#[test]
fn empty_cache_renders_background_only() {
    let req = request(&["a", "b"]);
    let collage = render(
        &req,
        &ImageCache::new(),
        &compute_layout(2, 32.0, 2.0),
        32,
        [10, 20, 30, 255],
    )
    .unwrap();
    assert_eq!(collage.filled_cells(), 0);
    assert!(collage.image.pixels().all(|p| p.0 == [10, 20, 30, 255]));
}

#[test]
fn overflow_is_clipped_to_the_cell() {
    // Very wide image: its aspect-fill rect spills far past both sides of cell 0.
    let req = request(&["wide", "other"]);
    let mut cache = ImageCache::new();
    cache.insert(AssetId::new("wide"), solid(400, 10, RED));
    let layout = compute_layout(2, 100.0, 4.0);

    let collage = render(&req, &cache, &layout, 100, BG).unwrap();
    let cell1 = layout.cells[1];
    for y in 0..100 {
        for x in (cell1.x0.round() as u32 - 4)..100 {
            assert_eq!(px(&collage.image, x, y), BG, "leak at ({x},{y})");
        }
    }
    // The border above and below the cell stays background.
    assert_eq!(px(&collage.image, 20, 2), BG);
    assert_eq!(px(&collage.image, 20, 98), BG);
    assert!(close(px(&collage.image, 20, 50), RED));
}

#[test]
fn crop_keeps_the_center_of_the_source() {
    // 60x10 source: red | white (15..45) | blue. A square cell shows the middle sixth.
    let mut src = RgbaImage::from_pixel(60, 10, Rgba(RED));
    for y in 0..10 {
        for x in 15..45 {
            src.put_pixel(x, y, Rgba(WHITE));
        }
        for x in 45..60 {
            src.put_pixel(x, y, Rgba(BLUE));
        }
    }
    let req = request(&["strip", "x", "y", "z"]);
    let mut cache = ImageCache::new();
    cache.insert(AssetId::new("strip"), DecodedImage::new(src));
    let layout = compute_layout(4, 200.0, 0.0);

    let collage = render(&req, &cache, &layout, 200, BG).unwrap();
    for x in [1, 50, 98] {
        assert!(close(px(&collage.image, x, 50), WHITE), "x={x}");
    }
}

#[test]
fn cells_past_the_layout_are_skipped() {
    let req = request(&["a", "b", "c"]);
    let mut cache = ImageCache::new();
    for id in ["a", "b", "c"] {
        cache.insert(AssetId::new(id), solid(4, 4, RED));
    }
    let collage = render(&req, &cache, &compute_layout(2, 50.0, 2.0), 50, BG).unwrap();
    assert_eq!(collage.filled, vec![true, true, false]);
}

#[test]
fn zero_canvas_is_rejected() {
    let req = request(&["a", "b"]);
    assert!(render(&req, &ImageCache::new(), &compute_layout(2, 0.0, 0.0), 0, BG).is_err());
}

#[test]
fn persist_returns_the_collage_or_the_store_error_verbatim() {
    let req = request(&["a", "b"]);
    let collage = render(&req, &ImageCache::new(), &compute_layout(2, 16.0, 1.0), 16, BG).unwrap();

    let ok = MemoryPhotoStore::new();
    let saved = persist(collage.clone(), &ok).unwrap();
    assert_eq!(saved.stored.0, "mem-1");
    assert_eq!(saved.collage.request, req);
    assert_eq!(ok.len(), 1);

    let bad = MemoryPhotoStore::failing("photo library access revoked");
    let err = persist(collage, &bad).unwrap_err();
    assert_eq!(
        err.to_string(),
        "persistence failure: photo library access revoked"
    );
    assert!(bad.is_empty());
}

#[test]
fn straight_alpha_over() {
    assert_eq!(over_straight(BG, RED), RED);
    assert_eq!(over_straight(BG, [255, 255, 255, 0]), BG);
    let half = over_straight([0, 0, 0, 255], [255, 255, 255, 128]);
    assert_eq!(half[3], 255);
    assert!(half[0].abs_diff(128) <= 1);
}
