use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ConvertError, ConvertResult};

/// Encoder settings shared by segment encoding and merging.
///
/// Every field has a default, so a JSON config file only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderOpts {
    /// ffmpeg video codec (`-c:v`).
    pub codec: String,
    /// Preset for per-segment encodes.
    pub preset: String,
    /// Preset for the merge re-encode.
    pub merge_preset: String,
    /// Constant rate factor.
    pub crf: u8,
    /// Output pixel format.
    pub pix_fmt: String,
    /// ffmpeg worker threads (0 lets ffmpeg decide).
    pub threads: u32,
    /// Background used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Overwrite existing output files.
    pub overwrite: bool,
}

impl Default for EncoderOpts {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            merge_preset: "medium".to_string(),
            crf: 23,
            pix_fmt: "yuv420p".to_string(),
            threads: 4,
            bg_rgba: [0, 0, 0, 255],
            overwrite: true,
        }
    }
}

impl EncoderOpts {
    /// Load settings from a JSON file, falling back to defaults for absent keys.
    pub fn from_json_path(path: &Path) -> ConvertResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read encoder config '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&text).map_err(|e| {
            ConvertError::validation(format!("encoder config '{}': {e}", path.display()))
        })?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject settings ffmpeg is certain to refuse.
    pub fn validate(&self) -> ConvertResult<()> {
        for (name, value) in [
            ("codec", &self.codec),
            ("preset", &self.preset),
            ("merge_preset", &self.merge_preset),
            ("pix_fmt", &self.pix_fmt),
        ] {
            if value.trim().is_empty() {
                return Err(ConvertError::validation(format!(
                    "encoder {name} must be non-empty"
                )));
            }
        }
        if self.crf > 63 {
            return Err(ConvertError::validation(format!(
                "encoder crf must be in 0..=63, got {}",
                self.crf
            )));
        }
        Ok(())
    }

    /// Chroma-subsampled outputs need even frame dimensions.
    pub(crate) fn needs_even_dimensions(&self) -> bool {
        self.pix_fmt.starts_with("yuv420") || self.pix_fmt.starts_with("yuv422")
    }

    /// Codec arguments placed after the inputs.
    pub(crate) fn output_args(&self, preset: &str) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            preset.to_string(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-pix_fmt".to_string(),
            self.pix_fmt.clone(),
            "-threads".to_string(),
            self.threads.to_string(),
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/opts.rs"]
mod tests;
