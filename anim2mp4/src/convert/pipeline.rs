use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::composite::extract::{CompositedFrame, extract_frames, file_stem};
use crate::encode::ffmpeg::encode_segment;
use crate::encode::opts::EncoderOpts;
use crate::foundation::core::Fps;
use crate::foundation::error::{ConvertError, ConvertResult};
use crate::inspect::inspector::inspect;
use crate::plan::segment::{NO_SPLIT, split};

/// Per-run conversion settings.
#[derive(Clone, Debug)]
pub struct ConvertOpts {
    /// Output frame rate.
    pub fps: Fps,
    /// Percentage of frames placed in the first segment; [`NO_SPLIT`] keeps one segment.
    pub split_ratio: u32,
    /// Directory receiving `<stem>_part<N>.mp4` files.
    pub output_dir: PathBuf,
    /// ffmpeg settings.
    pub encoder: EncoderOpts,
}

impl Default for ConvertOpts {
    fn default() -> Self {
        Self {
            fps: Fps { num: 20, den: 1 },
            split_ratio: NO_SPLIT,
            output_dir: PathBuf::from("."),
            encoder: EncoderOpts::default(),
        }
    }
}

impl ConvertOpts {
    /// Reject settings no file could be converted with.
    pub fn validate(&self) -> ConvertResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.split_ratio == 0 || self.split_ratio > NO_SPLIT {
            return Err(ConvertError::validation(format!(
                "split ratio must be in 1..=100, got {}",
                self.split_ratio
            )));
        }
        self.encoder.validate()
    }
}

/// Result of converting one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// MP4 segments written, in segment order.
    Converted(Vec<PathBuf>),
    /// Nothing to encode (still image or single frame).
    Skipped(String),
}

impl FileOutcome {
    /// Written MP4 paths; empty when skipped.
    pub fn outputs(&self) -> &[PathBuf] {
        match self {
            Self::Converted(paths) => paths,
            Self::Skipped(_) => &[],
        }
    }
}

/// Output path of segment `part` (1-based) for `source`.
pub fn segment_output_path(output_dir: &Path, source: &Path, part: usize) -> PathBuf {
    output_dir.join(format!("{}_part{part}.mp4", file_stem(source)))
}

/// Convert one animated image into MP4 segments.
///
/// Frames are composited into a private temporary directory that is removed on every exit
/// path. When any segment fails to encode, the segments already written by this call are
/// deleted as well.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn convert_file(path: &Path, opts: &ConvertOpts) -> ConvertResult<FileOutcome> {
    opts.validate()?;
    tracing::info!("starting conversion");

    let info = inspect(path)?;
    let work_dir = tempfile::Builder::new()
        .prefix("anim2mp4-")
        .tempdir()
        .context("create temporary frame directory")?;

    let frames = extract_frames(path, work_dir.path(), Some(&info))?;
    if frames.is_empty() {
        tracing::warn!("no frames extracted, nothing to convert");
        return Ok(FileOutcome::Skipped(format!(
            "{} has {} frame(s); nothing to animate",
            info.format, info.frame_count
        )));
    }

    std::fs::create_dir_all(&opts.output_dir)
        .with_context(|| format!("create output directory '{}'", opts.output_dir.display()))?;

    let mut written: Vec<PathBuf> = Vec::new();
    let result = encode_segments(path, frames.frames(), opts, &mut written);
    if let Err(err) = result {
        for out in &written {
            if let Err(e) = std::fs::remove_file(out) {
                tracing::warn!(
                    out = %out.display(),
                    error = %e,
                    "failed to remove partial segment"
                );
            }
        }
        tracing::error!(error = %err, "conversion failed");
        return Err(err);
    }

    tracing::info!(segments = written.len(), "conversion finished");
    Ok(FileOutcome::Converted(written))
}

fn encode_segments(
    path: &Path,
    frames: &[CompositedFrame],
    opts: &ConvertOpts,
    written: &mut Vec<PathBuf>,
) -> ConvertResult<()> {
    for (i, segment) in split(frames.len(), opts.split_ratio)?.into_iter().enumerate() {
        let part = i + 1;
        if segment.is_empty() {
            tracing::warn!(part, "segment is empty, skipping");
            continue;
        }
        let out = segment_output_path(&opts.output_dir, path, part);
        tracing::info!(part, frames = segment.len(), "creating video segment");
        let existed = out.exists();
        if let Err(err) = encode_segment(segment.slice(frames), opts.fps, &out, &opts.encoder) {
            // ffmpeg may have left a truncated file behind.
            if !existed && out.exists() {
                written.push(out);
            }
            return Err(err);
        }
        written.push(out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/convert/pipeline.rs"]
mod tests;
