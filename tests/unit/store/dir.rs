use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_dir_store").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn visible_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| !n.starts_with('.'))
        .collect();
    names.sort();
    names
}

#[test]
fn png_commit_round_trips_pixels() {
    let dir = scratch_dir("png");
    let store = DirPhotoStore::new(&dir, StoreFormat::Png).unwrap();
    let img = RgbaImage::from_pixel(5, 4, image::Rgba([1, 2, 3, 255]));

    let id = store.commit(&img).unwrap();
    assert!(id.0.ends_with(".png"));
    assert_eq!(visible_files(&dir), vec![id.0.clone()]);

    let back = image::open(dir.join(&id.0)).unwrap().into_rgba8();
    assert_eq!(back, img);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1, "temp file left behind");
}

#[test]
fn jpeg_commit_and_unique_names() {
    let dir = scratch_dir("jpeg");
    let store = DirPhotoStore::new(&dir, StoreFormat::Jpeg { quality: 90 }).unwrap();
    let img = RgbaImage::from_pixel(16, 16, image::Rgba([200, 10, 10, 255]));

    let a = store.commit(&img).unwrap();
    let b = store.commit(&img).unwrap();
    assert_ne!(a, b);
    assert!(a.0.ends_with(".jpg"));
    assert_eq!(visible_files(&dir).len(), 2);
    assert_eq!(image::image_dimensions(dir.join(&a.0)).unwrap(), (16, 16));
}

#[test]
fn unwritable_destination_is_a_persistence_failure() {
    let base = scratch_dir("blocked");
    std::fs::create_dir_all(&base).unwrap();
    let file_in_the_way = base.join("not_a_dir");
    std::fs::write(&file_in_the_way, "x").unwrap();

    let store = DirPhotoStore::new(&file_in_the_way, StoreFormat::Png).unwrap();
    let err = store.commit(&RgbaImage::new(2, 2)).unwrap_err();
    assert!(matches!(err, CollageError::Persistence(_)), "{err}");
}

#[test]
fn jpeg_quality_is_validated() {
    assert!(DirPhotoStore::new("target/x", StoreFormat::Jpeg { quality: 0 }).is_err());
}
