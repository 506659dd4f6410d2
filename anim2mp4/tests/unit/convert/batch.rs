use super::*;
use crate::fixtures::{GifTile, gif_bytes};

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn discovery_matches_extensions_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "b10.gif");
    touch(dir.path(), "b2.GIF");
    touch(dir.path(), "a.WebP");
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "clip.mp4");
    std::fs::create_dir(dir.path().join("nested.gif")).unwrap();

    let found = discover_inputs(dir.path()).unwrap();
    assert_eq!(names(&found), ["a.WebP", "b2.GIF", "b10.gif"]);
}

#[test]
fn zero_jobs_is_rejected() {
    let err = convert_batch(&[], &ConvertOpts::default(), 0).unwrap_err();
    assert!(matches!(err, ConvertError::Validation(_)));
}

#[test]
fn failures_do_not_stop_siblings_and_order_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.gif");
    std::fs::write(&broken, b"garbage").unwrap();
    let still = dir.path().join("still.gif");
    std::fs::write(
        &still,
        gif_bytes(4, 4, &[0, 0, 0], &[GifTile::filled(0, 0, 4, 4, 0)]),
    )
    .unwrap();
    let missing = dir.path().join("missing.webp");

    let opts = ConvertOpts {
        output_dir: dir.path().join("out"),
        ..ConvertOpts::default()
    };
    let inputs = vec![broken.clone(), still.clone(), missing.clone()];
    for jobs in [1, 3] {
        let report = convert_batch(&inputs, &opts, jobs).unwrap();
        let order: Vec<&PathBuf> = report.files.iter().map(|f| &f.path).collect();
        assert_eq!(order, [&broken, &still, &missing]);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.converted(), 0);
        assert!(report.outputs().is_empty());
    }
}
