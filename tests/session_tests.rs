mod common;

use common::*;
use image::GenericImageView;
use img_shrink::{
    default_tier, find_tier, BatchOptions, CompressorConfig, HandleRegistry, ImageStatus,
    Session, QUALITY_TIERS,
};
use std::sync::Arc;

fn session_with_tracking(threads: Option<usize>) -> (Arc<TrackingRegistry>, Session) {
    let registry = Arc::new(TrackingRegistry::default());
    let shared: Arc<dyn HandleRegistry> = registry.clone();
    let session = Session::with_registry(
        shared,
        CompressorConfig::default(),
        &BatchOptions { threads },
    )
    .unwrap();
    (registry, session)
}

#[test]
fn test_corrupt_image_fails_alone() {
    let (_, session) = session_with_tracking(Some(4));
    session.enqueue(vec![
        png_payload("a.png", 64, 48),
        jpeg_payload("b.jpg", 64, 48),
        corrupt_payload("c.jpg"),
        png_payload("d.png", 64, 48),
        jpeg_payload("e.jpg", 64, 48),
    ]);

    let report = session.compress_all(&default_tier()).unwrap();
    assert_eq!((report.succeeded, report.failed), (4, 1));

    let images = session.list_images();
    for (index, image) in images.iter().enumerate() {
        if index == 2 {
            assert_eq!(image.status().label(), "error");
            assert!(image.error_message().is_some());
            assert!(session.downloadable_of(image).is_none());
        } else {
            assert_eq!(image.status().label(), "done", "{}", image.name());
        }
    }
}

#[test]
fn test_all_items_failing_is_a_normal_outcome() {
    let (_, session) = session_with_tracking(None);
    session.enqueue(vec![corrupt_payload("x.jpg"), corrupt_payload("y.jpg")]);

    let report = session.compress_all(&default_tier()).unwrap();
    assert_eq!(report.failed, 2);
    assert!(session.is_settled());
    assert!(session.downloadables().is_empty());
}

#[test]
fn test_tier_dimensions() {
    let (_, session) = session_with_tracking(None);
    session.enqueue(vec![png_payload("a.png", 330, 220)]);

    for tier in QUALITY_TIERS.iter() {
        session.compress_all(tier).unwrap();
        let download = session.downloadables().remove(0);
        let decoded = image::load_from_memory(download.output.bytes()).unwrap();
        let expected = (
            (330.0 * tier.scale).round() as u32,
            (220.0 * tier.scale).round() as u32,
        );
        assert_eq!(decoded.dimensions(), expected, "tier {}", tier.id);
    }
}

#[test]
fn test_transparent_source_becomes_jpeg() {
    let (_, session) = session_with_tracking(None);
    session.enqueue(vec![transparent_png_payload("logo.png", 40, 40)]);
    session.compress_all(&find_tier("print").unwrap()).unwrap();

    let download = session.downloadables().remove(0);
    assert_eq!(download.filename, "compressed-logo.jpg");
    assert_eq!(download.output.media_type(), "image/jpeg");
    assert_eq!(
        image::guess_format(download.output.bytes()).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[test]
fn test_done_status_carries_size() {
    let (_, session) = session_with_tracking(None);
    session.enqueue(vec![jpeg_payload("a.jpg", 200, 100)]);
    session.compress_all(&find_tier("minimal").unwrap()).unwrap();

    let image = session.list_images().remove(0);
    match image.status() {
        ImageStatus::Done {
            output, size_bytes, ..
        } => {
            assert!(*size_bytes > 0);
            assert_eq!(*size_bytes, output.size_bytes());
        }
        other => panic!("expected done, got {:?}", other),
    }
    assert!(image.reduction_percent().is_some());
}

#[test]
fn test_clear_leaks_no_handles() {
    let (registry, session) = session_with_tracking(Some(2));
    session.enqueue(vec![
        png_payload("a.png", 32, 32),
        png_payload("b.png", 32, 32),
        corrupt_payload("c.jpg"),
    ]);
    session.compress_all(&default_tier()).unwrap();
    assert_eq!(registry.live_count(), 5);

    session.clear();
    assert!(session.list_images().is_empty());
    assert_eq!(registry.live_count(), 0);
    assert_eq!(registry.released_count() as u64, registry.acquired_count());
}

#[test]
fn test_recompress_releases_previous_outputs() {
    let (registry, session) = session_with_tracking(None);
    session.enqueue(vec![png_payload("a.png", 32, 32)]);

    for _ in 0..3 {
        session.compress_all(&default_tier()).unwrap();
    }
    assert_eq!(registry.live_count(), 2);
    assert_eq!(
        registry.live_media_types(),
        vec!["image/jpeg".to_string(), "image/png".to_string()]
    );
}

#[test]
fn test_remove_releases_item_handles() {
    let (registry, session) = session_with_tracking(None);
    let queued = session.enqueue(vec![png_payload("a.png", 16, 16), png_payload("b.png", 16, 16)]);
    let first = queued[0].id().clone();
    drop(queued);

    assert!(session.remove(&first));
    assert!(!session.remove(&first));
    assert_eq!(registry.live_count(), 1);
    assert_eq!(session.list_images().len(), 1);
}

#[test]
fn test_snapshots_are_idempotent() {
    let (_, session) = session_with_tracking(None);
    session.enqueue(vec![png_payload("a.png", 16, 16), corrupt_payload("b.jpg")]);
    assert_eq!(session.list_images(), session.list_images());

    session.compress_all(&default_tier()).unwrap();
    assert_eq!(session.list_images(), session.list_images());
}

#[test]
fn test_enqueue_preserves_submission_order() {
    let (_, session) = session_with_tracking(None);
    session.enqueue(vec![png_payload("z.png", 4, 4), png_payload("a.png", 4, 4)]);
    session.enqueue(vec![png_payload("m.png", 4, 4)]);

    let names: Vec<_> = session
        .list_images()
        .iter()
        .map(|i| i.name().to_string())
        .collect();
    assert_eq!(names, vec!["z.png", "a.png", "m.png"]);
}

#[test]
fn test_progress_hook_can_borrow_locals() {
    let (_, session) = session_with_tracking(Some(2));
    session.enqueue(vec![
        png_payload("a.png", 16, 16),
        corrupt_payload("b.jpg"),
        png_payload("c.png", 16, 16),
    ]);

    let settled = std::sync::Mutex::new(Vec::new());
    let hook = |outcome: &img_shrink::CompressionOutcome| {
        settled.lock().unwrap().push(outcome.is_done());
    };
    let report = session
        .compress_all_with_progress(&default_tier(), Some(&hook))
        .unwrap();

    let mut seen = settled.into_inner().unwrap();
    seen.sort();
    assert_eq!(seen, vec![false, true, true]);
    assert_eq!((report.succeeded, report.failed), (2, 1));
}
