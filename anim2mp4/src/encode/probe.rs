use std::path::{Path, PathBuf};

use crate::foundation::error::{ConvertError, ConvertResult};

/// Video stream metadata reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoProbe {
    /// Probed file.
    pub path: PathBuf,
    /// Width of the first video stream.
    pub width: u32,
    /// Height of the first video stream.
    pub height: u32,
}

/// Probe `path` through `ffprobe`.
pub fn probe(path: &Path) -> ConvertResult<VideoProbe> {
    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| ConvertError::merge(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ConvertError::merge(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(path, &out.stdout)
}

pub(crate) fn parse_probe_json(path: &Path, json: &[u8]) -> ConvertResult<VideoProbe> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ConvertError::merge(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            ConvertError::merge(format!("no video stream found in '{}'", path.display()))
        })?;
    let (width, height) = match (video_stream.width, video_stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(ConvertError::merge(format!(
                "missing video dimensions from ffprobe for '{}'",
                path.display()
            )));
        }
    };
    Ok(VideoProbe {
        path: path.to_path_buf(),
        width,
        height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/probe.rs"]
mod tests;
