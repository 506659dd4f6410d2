use std::path::Path;

use crate::decode::{FrameSource, SourceFormat, open_source};
use crate::foundation::core::Canvas;
use crate::foundation::error::ConvertResult;

/// How an animation encodes its frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Every frame covers the whole canvas and renders standalone.
    Full,
    /// At least one frame is a tile smaller than the canvas and must be composited onto the
    /// accumulated canvas.
    Partial,
}

/// Result of inspecting an image file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AnimationInfo {
    /// Declared canvas size.
    pub canvas: Canvas,
    /// Update mode, decided once for the whole sequence.
    pub mode: UpdateMode,
    /// Total number of frames (1 for still images).
    pub frame_count: usize,
    /// Sum of per-frame durations seen during the scan, in milliseconds.
    pub duration_ms: u64,
    /// Container format.
    pub format: SourceFormat,
}

impl AnimationInfo {
    /// Return `true` when there is something to extract (more than one frame).
    pub fn is_animated(&self) -> bool {
        self.frame_count > 1
    }
}

/// Open `path` and classify it.
///
/// Fails only when the file cannot be opened as a supported image; frame-level decode errors
/// during the scan are logged and leave the metadata possibly incomplete.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn inspect(path: &Path) -> ConvertResult<AnimationInfo> {
    tracing::info!("analyzing image");
    let mut source = open_source(path)?;
    let info = inspect_source(source.as_mut());
    tracing::debug!(?info, "image analysis results");
    Ok(info)
}

/// Classify an already-open source, consuming its frames.
///
/// Scanning stops at the first tile whose size differs from the canvas: one partial tile is
/// enough to make the whole animation [`UpdateMode::Partial`].
pub fn inspect_source(source: &mut dyn FrameSource) -> AnimationInfo {
    let mut info = AnimationInfo {
        canvas: source.canvas(),
        mode: UpdateMode::Full,
        frame_count: 1,
        duration_ms: 0,
        format: source.format(),
    };
    if !source.is_animated() {
        return info;
    }

    let declared = source.frame_count();
    let mut counted = 0usize;
    let mut duration_ms = 0u64;
    loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                counted += 1;
                duration_ms += u64::from(frame.delay_ms);
                if !frame.placement.covers(info.canvas) {
                    info.mode = UpdateMode::Partial;
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, frame = counted, "error analyzing image frames");
                break;
            }
        }
    }

    info.duration_ms = duration_ms;
    info.frame_count = declared.unwrap_or(counted);
    info
}

#[cfg(test)]
#[path = "../../tests/unit/inspect/inspector.rs"]
mod tests;
