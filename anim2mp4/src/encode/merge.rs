use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::encode::ffmpeg::{ensure_parent_dir, is_ffmpeg_on_path};
use crate::encode::natural::natural_sort;
use crate::encode::opts::EncoderOpts;
use crate::encode::probe::{VideoProbe, probe};
use crate::foundation::core::Fps;
use crate::foundation::error::{ConvertError, ConvertResult};

/// Concatenate `files` into one MP4 at `dest`.
///
/// Inputs are ordered naturally by path. Each input is probed first; inputs that cannot be
/// probed are logged and left out. Every kept clip is scaled to fit the largest probed size,
/// centered on black padding and resampled to `fps` before concatenation.
#[tracing::instrument(skip_all, fields(dest = %dest.display(), inputs = files.len()))]
pub fn merge_videos(
    files: &[PathBuf],
    dest: &Path,
    fps: Fps,
    opts: &EncoderOpts,
) -> ConvertResult<PathBuf> {
    if files.is_empty() {
        return Err(ConvertError::merge("no video files provided for merging"));
    }
    opts.validate()?;

    let mut ordered = files.to_vec();
    natural_sort(&mut ordered);

    let mut clips: Vec<VideoProbe> = Vec::with_capacity(ordered.len());
    for file in &ordered {
        tracing::info!(clip = %file.display(), "loading clip");
        match probe(file) {
            Ok(clip) => clips.push(clip),
            Err(err) => tracing::error!(clip = %file.display(), %err, "skipping clip"),
        }
    }
    if clips.is_empty() {
        return Err(ConvertError::merge("no valid video clips to merge"));
    }

    let (width, height) = target_size(&clips);

    if !is_ffmpeg_on_path() {
        return Err(ConvertError::merge(
            "ffmpeg is required for merging, but was not found on PATH",
        ));
    }
    ensure_parent_dir(dest)?;

    tracing::info!(clips = clips.len(), width, height, "merging clips");
    let out = Command::new("ffmpeg")
        .args(merge_args(&clips, width, height, fps, opts))
        .arg(dest)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ConvertError::merge(format!("failed to spawn ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(ConvertError::merge(format!(
            "ffmpeg exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    Ok(dest.to_path_buf())
}

/// Largest probed width and height, rounded up to even.
pub(crate) fn target_size(clips: &[VideoProbe]) -> (u32, u32) {
    let width = clips.iter().map(|c| c.width).max().unwrap_or(2);
    let height = clips.iter().map(|c| c.height).max().unwrap_or(2);
    (width.next_multiple_of(2), height.next_multiple_of(2))
}

/// `-filter_complex` graph fitting `n` inputs into a `width`x`height` frame and concatenating them.
pub(crate) fn concat_filter(n: usize, width: u32, height: u32, fps: Fps) -> String {
    let fps = fps.to_ffmpeg_arg();
    let mut graph = String::new();
    for i in 0..n {
        graph.push_str(&format!(
            "[{i}:v:0]scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps}[v{i}];"
        ));
    }
    for i in 0..n {
        graph.push_str(&format!("[v{i}]"));
    }
    graph.push_str(&format!("concat=n={n}:v=1:a=0[out]"));
    graph
}

pub(crate) fn merge_args(
    clips: &[VideoProbe],
    width: u32,
    height: u32,
    fps: Fps,
    opts: &EncoderOpts,
) -> Vec<String> {
    let mut args = vec![
        if opts.overwrite { "-y" } else { "-n" }.to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ];
    for clip in clips {
        args.push("-i".to_string());
        args.push(clip.path.to_string_lossy().into_owned());
    }
    args.push("-filter_complex".to_string());
    args.push(concat_filter(clips.len(), width, height, fps));
    args.extend(["-map".to_string(), "[out]".to_string(), "-an".to_string()]);
    args.extend(opts.output_args(&opts.merge_preset));
    args.push("-movflags".to_string());
    args.push("+faststart".to_string());
    args
}

#[cfg(test)]
#[path = "../../tests/unit/encode/merge.rs"]
mod tests;
