use super::*;

#[test]
fn defaults_match_fast_h264_segments() {
    let opts = EncoderOpts::default();
    assert_eq!(opts.codec, "libx264");
    assert_eq!(opts.preset, "ultrafast");
    assert_eq!(opts.merge_preset, "medium");
    assert_eq!(opts.crf, 23);
    assert!(opts.needs_even_dimensions());
    opts.validate().unwrap();
}

#[test]
fn json_config_overrides_only_given_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encoder.json");
    std::fs::write(&path, r#"{ "crf": 18, "preset": "slow", "bg_rgba": [255, 255, 255, 255] }"#)
        .unwrap();

    let opts = EncoderOpts::from_json_path(&path).unwrap();
    assert_eq!(opts.crf, 18);
    assert_eq!(opts.preset, "slow");
    assert_eq!(opts.bg_rgba, [255, 255, 255, 255]);
    assert_eq!(opts.codec, "libx264");
}

#[test]
fn json_config_rejects_unknown_keys_and_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encoder.json");

    std::fs::write(&path, r#"{ "quality": 5 }"#).unwrap();
    assert!(matches!(
        EncoderOpts::from_json_path(&path),
        Err(ConvertError::Validation(_))
    ));

    std::fs::write(&path, r#"{ "crf": 99 }"#).unwrap();
    assert!(EncoderOpts::from_json_path(&path).is_err());

    std::fs::write(&path, r#"{ "codec": " " }"#).unwrap();
    assert!(EncoderOpts::from_json_path(&path).is_err());
}

#[test]
fn output_args_carry_codec_settings() {
    let opts = EncoderOpts::default();
    let args = opts.output_args("veryfast");
    assert_eq!(
        args,
        [
            "-c:v", "libx264", "-preset", "veryfast", "-crf", "23", "-pix_fmt", "yuv420p",
            "-threads", "4"
        ]
    );
}

#[test]
fn rgb_pixel_formats_accept_odd_dimensions() {
    let opts = EncoderOpts {
        pix_fmt: "yuv444p".to_string(),
        ..EncoderOpts::default()
    };
    assert!(!opts.needs_even_dimensions());
}
