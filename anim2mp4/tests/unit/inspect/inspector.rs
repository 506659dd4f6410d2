use super::*;
use crate::decode::RawFrame;
use crate::fixtures::{
    BLUE, GifTile, MockSource, RED, canvas, gif_bytes, red_blue_clear_frames, solid,
};

fn full_frames(n: usize) -> Vec<RawFrame> {
    (0..n)
        .map(|i| {
            let colour = if i % 2 == 0 { RED } else { BLUE };
            RawFrame::at(solid(4, 4, colour), 0, 0, 100)
        })
        .collect()
}

#[test]
fn full_frames_classify_as_full_and_sum_durations() {
    let mut source = MockSource::new(canvas(4, 4), full_frames(3));
    let info = inspect_source(&mut source);
    assert_eq!(info.mode, UpdateMode::Full);
    assert_eq!(info.frame_count, 3);
    assert_eq!(info.duration_ms, 300);
    assert_eq!(info.canvas, canvas(4, 4));
}

#[test]
fn first_partial_tile_stops_the_scan() {
    let mut source = MockSource::new(canvas(10, 10), red_blue_clear_frames());
    let info = inspect_source(&mut source);
    assert_eq!(info.mode, UpdateMode::Partial);
    assert_eq!(info.frame_count, 3);
    // Only frames 0 and 1 were scanned.
    assert_eq!(info.duration_ms, 200);
    assert!(source.next_frame().unwrap().is_some());
}

#[test]
fn still_source_returns_without_scanning() {
    let mut source = MockSource::new(canvas(4, 4), full_frames(1));
    let info = inspect_source(&mut source);
    assert_eq!(info.frame_count, 1);
    assert_eq!(info.mode, UpdateMode::Full);
    assert_eq!(info.duration_ms, 0);
    assert!(!info.is_animated());
    assert!(source.next_frame().unwrap().is_some());
}

#[test]
fn frame_count_is_derived_when_metadata_lacks_it() {
    let mut source = MockSource::new(canvas(4, 4), full_frames(5)).without_count();
    let info = inspect_source(&mut source);
    assert_eq!(info.frame_count, 5);
    assert_eq!(info.duration_ms, 500);
}

#[test]
fn scan_errors_are_not_fatal() {
    let mut source = MockSource::new(canvas(4, 4), full_frames(4)).failing_at(2);
    let info = inspect_source(&mut source);
    assert_eq!(info.mode, UpdateMode::Full);
    assert_eq!(info.frame_count, 4);
    assert_eq!(info.duration_ms, 200);

    let mut source = MockSource::new(canvas(4, 4), full_frames(4))
        .failing_at(2)
        .without_count();
    let info = inspect_source(&mut source);
    assert_eq!(info.frame_count, 2);
}

#[test]
fn partial_evidence_before_an_error_is_kept() {
    let mut frames = full_frames(3);
    frames[1] = RawFrame::at(solid(2, 2, BLUE), 1, 1, 40);
    let mut source = MockSource::new(canvas(4, 4), frames).failing_at(2);
    let info = inspect_source(&mut source);
    assert_eq!(info.mode, UpdateMode::Partial);
}

#[test]
fn inspect_is_idempotent_on_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("delta.gif");
    let bytes = gif_bytes(
        6,
        6,
        &[255, 0, 0, 0, 0, 255],
        &[GifTile::filled(0, 0, 6, 6, 0), GifTile::filled(2, 2, 2, 2, 1)],
    );
    std::fs::write(&path, bytes).unwrap();

    let a = inspect(&path).unwrap();
    let b = inspect(&path).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.mode, UpdateMode::Partial);
    assert_eq!(a.frame_count, 2);
    assert_eq!(a.format, SourceFormat::Gif);
    assert_eq!(a.duration_ms, 200);
}

#[test]
fn info_serializes_mode_in_lowercase() {
    let mut source = MockSource::new(canvas(10, 10), red_blue_clear_frames());
    let json = serde_json::to_value(inspect_source(&mut source)).unwrap();
    assert_eq!(json["mode"], "partial");
    assert_eq!(json["canvas"]["width"], 10);
}
