use super::*;
use crate::fixtures::{BLUE, CLEAR, MockSource, RED, canvas, red_blue_clear_frames, solid};

fn px(img: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    img.get_pixel(x, y).0
}

#[test]
fn partial_scenario_red_blue_then_transparent_delta() {
    let mut source = MockSource::new(canvas(10, 10), red_blue_clear_frames());
    let frames = composite_all(&mut source, UpdateMode::Partial).unwrap();
    assert_eq!(frames.len(), 3);

    assert!(frames[0].pixels().all(|p| p.0 == RED));

    for (x, y, p) in frames[1].enumerate_pixels() {
        let expected = if x < 2 && y < 2 { BLUE } else { RED };
        assert_eq!(p.0, expected, "pixel ({x}, {y})");
    }

    assert_eq!(frames[2], frames[1]);
}

#[test]
fn full_mode_frames_ignore_previous_canvas() {
    let mut half = solid(4, 4, CLEAR);
    half.put_pixel(3, 3, image::Rgba(BLUE));
    let frames = vec![
        RawFrame::at(solid(4, 4, RED), 0, 0, 10),
        RawFrame::at(half.clone(), 0, 0, 10),
    ];
    let mut source = MockSource::new(canvas(4, 4), frames);
    let out = composite_all(&mut source, UpdateMode::Full).unwrap();

    assert!(out[0].pixels().all(|p| p.0 == RED));
    assert_eq!(out[1], half);
}

#[test]
fn partial_mode_blends_semi_transparent_tile_pixels() {
    let mut source = MockSource::new(
        canvas(2, 1),
        vec![
            RawFrame::at(solid(2, 1, [255, 0, 0, 255]), 0, 0, 10),
            RawFrame::at(solid(1, 1, [0, 0, 255, 128]), 1, 0, 10),
        ],
    );
    let out = composite_all(&mut source, UpdateMode::Partial).unwrap();
    assert_eq!(px(&out[1], 0, 0), [255, 0, 0, 255]);
    assert_eq!(px(&out[1], 1, 0), [127, 0, 128, 191]);
}

#[test]
fn small_first_tile_still_yields_canvas_sized_frames() {
    let frames = vec![
        RawFrame::at(solid(2, 2, RED), 1, 1, 10),
        RawFrame::at(solid(1, 1, BLUE), 0, 0, 10),
    ];
    let mut source = MockSource::new(canvas(5, 4), frames);
    let out = composite_all(&mut source, UpdateMode::Partial).unwrap();

    for frame in &out {
        assert_eq!(frame.dimensions(), (5, 4));
    }
    assert_eq!(px(&out[0], 0, 0), CLEAR);
    assert_eq!(px(&out[0], 1, 1), RED);
    assert_eq!(px(&out[1], 0, 0), BLUE);
    assert_eq!(px(&out[1], 2, 2), RED);
}

#[test]
fn tiles_past_the_canvas_edge_are_clipped() {
    let frames = vec![
        RawFrame::at(solid(3, 3, RED), 0, 0, 10),
        RawFrame::at(solid(4, 4, BLUE), 2, 2, 10),
    ];
    let mut source = MockSource::new(canvas(3, 3), frames);
    let out = composite_all(&mut source, UpdateMode::Partial).unwrap();
    assert_eq!(out[1].dimensions(), (3, 3));
    assert_eq!(px(&out[1], 2, 2), BLUE);
    assert_eq!(px(&out[1], 1, 2), RED);
}

#[test]
fn mismatched_tile_geometry_is_an_extraction_error() {
    let mut bad = RawFrame::at(solid(2, 2, BLUE), 0, 0, 10);
    bad.placement.width = 3;
    let first = RawFrame::at(solid(4, 4, RED), 0, 0, 10);
    let mut compositor = Compositor::new(UpdateMode::Partial, canvas(4, 4), &first).unwrap();
    assert!(matches!(
        compositor.apply(&bad),
        Err(ConvertError::Extraction(_))
    ));
    // The running canvas is untouched by the failed step.
    assert!(compositor.into_current().pixels().all(|p| p.0 == RED));
}

#[test]
fn disposal_hints_do_not_change_partial_output() {
    let mut delta = RawFrame::at(solid(1, 1, BLUE), 0, 0, 10);
    delta.disposal = Disposal::Background;
    let mut source = MockSource::new(
        canvas(2, 2),
        vec![
            RawFrame::at(solid(2, 2, RED), 0, 0, 10),
            delta,
            RawFrame::at(solid(1, 1, CLEAR), 1, 1, 10),
        ],
    );
    let out = composite_all(&mut source, UpdateMode::Partial).unwrap();
    assert_eq!(px(&out[2], 0, 0), BLUE);
    assert_eq!(px(&out[2], 1, 1), RED);
}

#[test]
fn empty_source_composites_to_nothing() {
    let mut source = MockSource::new(canvas(2, 2), Vec::new());
    assert!(
        composite_all(&mut source, UpdateMode::Full)
            .unwrap()
            .is_empty()
    );
}
