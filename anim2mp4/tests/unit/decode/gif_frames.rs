use super::*;
use crate::fixtures::{GifTile, gif_bytes};

const GLOBAL: [u8; 6] = [255, 0, 0, 0, 0, 255];

#[test]
fn frames_without_local_palette_use_global_palette() {
    let bytes = gif_bytes(
        4,
        4,
        &GLOBAL,
        &[GifTile::filled(0, 0, 4, 4, 0), GifTile::filled(1, 1, 2, 2, 1)],
    );
    let mut source = GifSource::from_bytes(bytes).unwrap();

    let first = source.next_frame().unwrap().unwrap();
    assert!(first.tile.pixels().all(|p| p.0 == [255, 0, 0, 255]));

    let second = source.next_frame().unwrap().unwrap();
    assert!(second.tile.pixels().all(|p| p.0 == [0, 0, 255, 255]));
    assert_eq!(
        second.placement,
        Placement {
            x: 1,
            y: 1,
            width: 2,
            height: 2
        }
    );

    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn local_palette_wins_over_global_palette() {
    let mut tile = GifTile::filled(0, 0, 2, 2, 0);
    tile.palette = Some(vec![0, 255, 0, 0, 0, 0]);
    let bytes = gif_bytes(2, 2, &GLOBAL, &[GifTile::filled(0, 0, 2, 2, 0), tile]);
    let mut source = GifSource::from_bytes(bytes).unwrap();

    source.next_frame().unwrap().unwrap();
    let local = source.next_frame().unwrap().unwrap();
    assert!(local.tile.pixels().all(|p| p.0 == [0, 255, 0, 255]));
}

#[test]
fn transparent_index_decodes_to_zero_alpha() {
    let mut tile = GifTile::filled(0, 0, 2, 1, 0);
    tile.indices = vec![0, 1];
    tile.transparent = Some(1);
    let bytes = gif_bytes(2, 1, &GLOBAL, &[tile]);
    let mut source = GifSource::from_bytes(bytes).unwrap();

    let frame = source.next_frame().unwrap().unwrap();
    assert_eq!(frame.tile.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(frame.tile.get_pixel(1, 0).0[3], 0);
}

#[test]
fn metadata_reports_count_canvas_and_delay() {
    let mut slow = GifTile::filled(0, 0, 3, 2, 0);
    slow.delay = 25;
    let bytes = gif_bytes(
        3,
        2,
        &GLOBAL,
        &[slow, GifTile::filled(0, 0, 3, 2, 1), GifTile::filled(0, 0, 3, 2, 0)],
    );
    let mut source = GifSource::from_bytes(bytes).unwrap();
    assert_eq!(source.frame_count(), Some(3));
    assert!(source.is_animated());
    assert_eq!(source.canvas(), Canvas::new(3, 2).unwrap());

    let first = source.next_frame().unwrap().unwrap();
    assert_eq!(first.delay_ms, 250);
    assert_eq!(first.disposal, Disposal::Keep);
}

#[test]
fn single_frame_gif_is_not_animated() {
    let bytes = gif_bytes(2, 2, &GLOBAL, &[GifTile::filled(0, 0, 2, 2, 0)]);
    let source = GifSource::from_bytes(bytes).unwrap();
    assert_eq!(source.frame_count(), Some(1));
    assert!(!source.is_animated());
}

#[test]
fn indexed_to_rgba8_maps_out_of_range_to_black() {
    let rgba = indexed_to_rgba8(&[0, 7], &[9, 8, 7], None);
    assert_eq!(rgba, vec![9, 8, 7, 255, 0, 0, 0, 255]);
}

#[test]
fn oversized_logical_screen_is_a_decode_error() {
    let mut bytes = gif_bytes(2, 2, &GLOBAL, &[GifTile::filled(0, 0, 2, 2, 0)]);
    // Logical screen descriptor follows the 6-byte signature.
    bytes[6..10].copy_from_slice(&[0xff; 4]);
    assert!(matches!(
        GifSource::from_bytes(bytes),
        Err(ConvertError::Decode(_))
    ));
}
