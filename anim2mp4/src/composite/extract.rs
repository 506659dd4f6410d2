use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbaImage;

use crate::composite::compositor::Compositor;
use crate::decode::{FrameSource, open_source};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ConvertError, ConvertResult};
use crate::inspect::inspector::{AnimationInfo, UpdateMode, inspect};

/// A composited frame persisted to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositedFrame {
    /// Position in the animation's temporal order.
    pub index: FrameIndex,
    /// PNG file holding the canvas-sized RGBA bitmap.
    pub path: PathBuf,
}

/// Ordered composited frames of one source. Empty means "nothing to extract".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<CompositedFrame>,
}

impl FrameSequence {
    /// Return `true` when the source had one frame or fewer.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Frames in temporal order.
    pub fn frames(&self) -> &[CompositedFrame] {
        &self.frames
    }

    /// Frame file paths in temporal order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.frames.iter().map(|f| f.path.as_path())
    }
}

/// `<stem>-<index:04>.png`; the fixed-width index keeps lexicographic and temporal order equal.
pub fn frame_file_name(stem: &str, index: FrameIndex) -> String {
    format!("{stem}-{:04}.png", index.0)
}

/// Frame files written by one extraction. Removed on drop unless committed.
#[derive(Default)]
struct PersistedFrames {
    frames: Vec<CompositedFrame>,
    committed: bool,
}

impl PersistedFrames {
    fn save(
        &mut self,
        image: &RgbaImage,
        index: FrameIndex,
        stem: &str,
        out_dir: &Path,
    ) -> ConvertResult<()> {
        let path = out_dir.join(frame_file_name(stem, index));
        // Tracked before writing so a half-written file is cleaned up too.
        self.frames.push(CompositedFrame {
            index,
            path: path.clone(),
        });
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write frame '{}'", path.display()))?;
        Ok(())
    }

    fn commit(mut self) -> Vec<CompositedFrame> {
        self.committed = true;
        std::mem::take(&mut self.frames)
    }
}

impl Drop for PersistedFrames {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for frame in &self.frames {
            if let Err(e) = std::fs::remove_file(&frame.path)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(
                    path = %frame.path.display(),
                    error = %e,
                    "failed to remove partial frame"
                );
            }
        }
    }
}

/// Composite every frame of the image at `path` into numbered PNGs inside `out_dir`.
///
/// `info` is re-derived with [`inspect`] when not supplied. Returns an empty sequence for
/// images with one frame or fewer. On failure no frame file written by this call remains.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn extract_frames(
    path: &Path,
    out_dir: &Path,
    info: Option<&AnimationInfo>,
) -> ConvertResult<FrameSequence> {
    tracing::info!("extracting frames");
    let info = match info {
        Some(info) => info.clone(),
        None => inspect(path)?,
    };
    if !info.is_animated() {
        tracing::warn!("image is not animated or contains only one frame");
        return Ok(FrameSequence::default());
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create frame directory '{}'", out_dir.display()))?;

    let mut source = open_source(path)?;
    let seq = extract_from_source(source.as_mut(), info.mode, &file_stem(path), out_dir)?;
    tracing::info!(frames = seq.len(), "successfully extracted frames");
    Ok(seq)
}

/// Composite an already-open source into numbered PNGs named after `stem`.
pub fn extract_from_source(
    source: &mut dyn FrameSource,
    mode: UpdateMode,
    stem: &str,
    out_dir: &Path,
) -> ConvertResult<FrameSequence> {
    let mut persisted = PersistedFrames::default();
    if let Err(e) = composite_to_disk(source, mode, stem, out_dir, &mut persisted) {
        tracing::error!(error = %e, written = persisted.frames.len(), "error extracting frames");
        return Err(e);
    }

    if persisted.frames.len() <= 1 {
        tracing::warn!(
            frames = persisted.frames.len(),
            "source yielded one frame or fewer"
        );
        return Ok(FrameSequence::default());
    }

    Ok(FrameSequence {
        frames: persisted.commit(),
    })
}

fn composite_to_disk(
    source: &mut dyn FrameSource,
    mode: UpdateMode,
    stem: &str,
    out_dir: &Path,
    persisted: &mut PersistedFrames,
) -> ConvertResult<()> {
    let canvas = source.canvas();
    let Some(first) = source.next_frame().map_err(|e| at_frame(0, e))? else {
        return Ok(());
    };
    let mut compositor = Compositor::new(mode, canvas, &first).map_err(|e| at_frame(0, e))?;
    persisted
        .save(compositor.current(), FrameIndex(0), stem, out_dir)
        .map_err(|e| at_frame(0, e))?;

    let mut index = 1usize;
    while let Some(frame) = source.next_frame().map_err(|e| at_frame(index, e))? {
        let image = compositor.apply(&frame).map_err(|e| at_frame(index, e))?;
        persisted
            .save(image, FrameIndex(index), stem, out_dir)
            .map_err(|e| at_frame(index, e))?;
        index += 1;
    }
    Ok(())
}

fn at_frame(index: usize, err: ConvertError) -> ConvertError {
    match err {
        ConvertError::Extraction(msg) => ConvertError::extraction(format!("frame {index}: {msg}")),
        other => ConvertError::extraction(format!("frame {index}: {other:#}")),
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frames".to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/composite/extract.rs"]
mod tests;
