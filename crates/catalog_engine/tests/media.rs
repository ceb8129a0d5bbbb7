use std::fs;

use catalog_core::{MediaFetchResult, ProductRecord};
use catalog_engine::{media_filename, MediaAcquisition, MediaDispatch, MediaStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn acquisition(temp: &TempDir) -> MediaAcquisition {
    MediaAcquisition::new(MediaStore::open(temp.path().to_path_buf()).unwrap())
}

fn record_with_images(urls: &[&str]) -> ProductRecord {
    let mut record = ProductRecord::new("https://x/p1");
    record.sku = "ABC".to_string();
    record.name = "Radiant Tee".to_string();
    record.image_urls = urls.iter().map(|u| u.to_string()).collect();
    record
}

#[test]
fn filename_is_deterministic_and_keeps_real_extensions() {
    let a = media_filename("WS12", "https://cdn.example/img/tee.jpg");
    let b = media_filename("WS12", "https://cdn.example/img/tee.jpg");
    assert_eq!(a, b);
    assert!(a.starts_with("WS12_"), "unexpected name: {a}");
    assert!(a.ends_with(".jpg"), "unexpected name: {a}");
    // sku + '_' + 8 hex chars + extension
    assert_eq!(a.len(), "WS12_".len() + 8 + ".jpg".len());

    let distinct = media_filename("WS12", "https://cdn.example/img/other.jpg");
    assert_ne!(a, distinct);
}

#[test]
fn suspicious_extensions_fall_back_to_jpg() {
    assert!(media_filename("WS12", "https://cdn.example/img/raw").ends_with(".jpg"));
    assert!(media_filename("WS12", "https://cdn.example/img/pic.superlong").ends_with(".jpg"));
    assert!(media_filename("WS12", "https://cdn.example/img/pic.png?x=1").ends_with(".png"));
    assert!(media_filename("WS12", "https://cdn.example/p.j-g").ends_with(".jpg"));
}

#[test]
fn blank_sku_gets_a_placeholder() {
    let name = media_filename("", "https://cdn.example/img/tee.jpg");
    assert!(name.starts_with("unknown_"), "unexpected name: {name}");
}

#[test]
fn join_releases_the_record_only_after_every_completion() {
    let temp = TempDir::new().unwrap();
    let mut media = acquisition(&temp);

    let record = record_with_images(&["https://cdn.example/a.jpg", "https://cdn.example/b.jpg"]);
    let MediaDispatch::Pending { tasks, .. } = media.begin(record) else {
        panic!("two candidates must dispatch");
    };
    assert_eq!(tasks.len(), 2);
    assert_eq!(media.pending(), 1);

    // Completions arrive out of order; the first one must not release.
    let early = media.complete(&tasks[1], MediaFetchResult::Failed("http status 404".into()));
    assert!(early.is_none());
    assert_eq!(media.pending(), 1);

    let released = media
        .complete(&tasks[0], MediaFetchResult::Fetched(b"jpegbytes".to_vec()))
        .expect("last completion releases the record");
    assert_eq!(media.pending(), 0);

    // One outcome per dispatched task, success and failure side by side.
    assert_eq!(released.images.len(), 2);
    assert_eq!(released.images.iter().filter(|o| o.is_downloaded()).count(), 1);
    let downloaded = released
        .images
        .iter()
        .find(|o| o.is_downloaded())
        .unwrap();
    assert_eq!(downloaded.source_url, "https://cdn.example/a.jpg");
}

#[test]
fn duplicate_candidates_dispatch_once() {
    let temp = TempDir::new().unwrap();
    let mut media = acquisition(&temp);

    let record = record_with_images(&[
        "https://cdn.example/a.jpg",
        "https://cdn.example/a.jpg",
        "https://cdn.example/b.jpg",
    ]);
    let MediaDispatch::Pending { tasks, .. } = media.begin(record) else {
        panic!("expected dispatch");
    };
    assert_eq!(tasks.len(), 2);
}

#[test]
fn no_candidates_means_immediately_ready() {
    let temp = TempDir::new().unwrap();
    let mut media = acquisition(&temp);

    let record = record_with_images(&[]);
    match media.begin(record) {
        MediaDispatch::Ready(record) => assert!(record.images.is_empty()),
        MediaDispatch::Pending { .. } => panic!("nothing to fetch"),
    }
    assert_eq!(media.pending(), 0);
}

#[test]
fn fetched_bytes_land_on_disk_with_a_checksum() {
    let temp = TempDir::new().unwrap();
    let mut media = acquisition(&temp);

    let record = record_with_images(&["https://cdn.example/a.jpg"]);
    let MediaDispatch::Pending { tasks, .. } = media.begin(record) else {
        panic!("expected dispatch");
    };

    let released = media
        .complete(&tasks[0], MediaFetchResult::Fetched(b"jpegbytes".to_vec()))
        .unwrap();
    let outcome = &released.images[0];
    match &outcome.status {
        catalog_core::ImageStatus::Downloaded {
            local_path,
            checksum,
        } => {
            assert_eq!(fs::read(local_path).unwrap(), b"jpegbytes");
            assert_eq!(checksum.len(), 64);
            assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
        }
        other => panic!("expected a downloaded outcome, got {other:?}"),
    }
}

#[test]
fn failed_fetches_store_nothing() {
    let temp = TempDir::new().unwrap();
    let mut media = acquisition(&temp);

    let record = record_with_images(&["https://cdn.example/a.jpg"]);
    let MediaDispatch::Pending { tasks, .. } = media.begin(record) else {
        panic!("expected dispatch");
    };
    let released = media
        .complete(&tasks[0], MediaFetchResult::Failed("timeout".into()))
        .unwrap();
    assert!(!released.images[0].is_downloaded());

    let stored: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert!(stored.is_empty(), "failed fetch must not leave a file");
}

#[test]
fn unknown_completions_are_ignored() {
    let temp = TempDir::new().unwrap();
    let mut media = acquisition(&temp);

    let task = catalog_core::MediaTask {
        record: 42,
        source_url: "https://cdn.example/a.jpg".to_string(),
        filename: "ABC_deadbeef.jpg".to_string(),
    };
    assert!(media
        .complete(&task, MediaFetchResult::Failed("late".into()))
        .is_none());
}
