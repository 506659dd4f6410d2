use super::*;

#[test]
fn picks_first_video_stream() {
    let json = br#"{
        "streams": [
            {"codec_type": "audio"},
            {"codec_type": "video", "width": 320, "height": 240},
            {"codec_type": "video", "width": 16, "height": 16}
        ],
        "format": {"duration": "2.500000"}
    }"#;
    let probe = parse_probe_json(Path::new("a_part1.mp4"), json).unwrap();
    assert_eq!((probe.width, probe.height), (320, 240));
    assert_eq!(probe.path, PathBuf::from("a_part1.mp4"));
}

#[test]
fn missing_video_stream_is_a_merge_error() {
    let json = br#"{"streams": [{"codec_type": "audio"}]}"#;
    let err = parse_probe_json(Path::new("x.mp4"), json).unwrap_err();
    assert!(matches!(err, ConvertError::Merge(_)));
}

#[test]
fn zero_or_missing_dimensions_are_rejected() {
    let json = br#"{"streams": [{"codec_type": "video", "width": 0, "height": 10}]}"#;
    assert!(parse_probe_json(Path::new("x.mp4"), json).is_err());
    let json = br#"{"streams": [{"codec_type": "video", "width": 10}]}"#;
    assert!(parse_probe_json(Path::new("x.mp4"), json).is_err());
}

#[test]
fn garbage_output_is_a_merge_error() {
    let err = parse_probe_json(Path::new("x.mp4"), b"not json").unwrap_err();
    assert!(matches!(err, ConvertError::Merge(_)));
}
