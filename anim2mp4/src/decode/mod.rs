//! Source decoding: container sniffing and per-frame tile access.
//!
//! Pixel codecs are delegated to `gif` and `image`; this module only reads enough container
//! framing to recover each tile's placement rectangle, duration and disposal hint.

pub(crate) mod gif_frames;
pub(crate) mod still;
pub(crate) mod webp_frames;

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Placement};
use crate::foundation::error::{ConvertError, ConvertResult};

/// Container format of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum SourceFormat {
    /// GIF87a/GIF89a.
    Gif,
    /// RIFF WebP (simple or extended).
    WebP,
    /// Any other still format readable by `image`, named by its canonical extension.
    Other(&'static str),
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gif => f.write_str("GIF"),
            Self::WebP => f.write_str("WEBP"),
            Self::Other(ext) => write!(f, "{}", ext.to_ascii_uppercase()),
        }
    }
}

/// What the container asks to happen to a frame's region before the next frame is drawn.
///
/// Decoded for diagnostics; compositing always keeps the accumulated canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum Disposal {
    /// No disposal requested (leave in place).
    #[default]
    Keep,
    /// Clear the region to the background.
    Background,
    /// Restore the region to the previous canvas state.
    Previous,
}

/// One decoded frame: a straight-alpha RGBA8 tile and where it goes on the canvas.
#[derive(Clone, Debug)]
pub struct RawFrame {
    /// Decoded tile pixels; dimensions equal the placement size.
    pub tile: image::RgbaImage,
    /// Tile rectangle within the canvas.
    pub placement: Placement,
    /// Display duration in milliseconds (0 when absent).
    pub delay_ms: u32,
    /// Disposal hint from the container.
    pub disposal: Disposal,
}

impl RawFrame {
    /// Build a frame whose placement origin is `(x, y)` and size is taken from `tile`.
    pub fn at(tile: image::RgbaImage, x: u32, y: u32, delay_ms: u32) -> Self {
        let (width, height) = tile.dimensions();
        Self {
            tile,
            placement: Placement {
                x,
                y,
                width,
                height,
            },
            delay_ms,
            disposal: Disposal::Keep,
        }
    }
}

/// An open animated-image container that yields frames in temporal order.
///
/// Implementations own their decoder state; dropping the value releases it.
pub trait FrameSource {
    /// Declared container format.
    fn format(&self) -> SourceFormat;
    /// Full canvas size.
    fn canvas(&self) -> Canvas;
    /// Total frame count when the container metadata provides it.
    fn frame_count(&self) -> Option<usize>;
    /// Return `false` for single still images.
    fn is_animated(&self) -> bool;
    /// Decode the next frame, or `Ok(None)` after the last one.
    fn next_frame(&mut self) -> ConvertResult<Option<RawFrame>>;
}

/// Open `path` and pick a decoder from its content signature.
pub fn open_source(path: &Path) -> ConvertResult<Box<dyn FrameSource>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read source '{}'", path.display()))
        .map_err(|e| ConvertError::decode(format!("{e:#}")))?;

    let format = image::guess_format(&bytes).map_err(|e| {
        ConvertError::decode(format!(
            "'{}' is not a recognised image: {e}",
            path.display()
        ))
    })?;

    match format {
        image::ImageFormat::Gif => Ok(Box::new(gif_frames::GifSource::from_bytes(bytes)?)),
        image::ImageFormat::WebP => {
            let container = webp_frames::WebpContainer::parse(&bytes)?;
            if container.animated {
                Ok(Box::new(webp_frames::WebpSource::new(bytes, container)?))
            } else {
                Ok(Box::new(still::StillSource::from_bytes(
                    bytes,
                    image::ImageFormat::WebP,
                )?))
            }
        }
        other => Ok(Box::new(still::StillSource::from_bytes(bytes, other)?)),
    }
}

pub(crate) fn source_format_of(format: image::ImageFormat) -> SourceFormat {
    match format {
        image::ImageFormat::Gif => SourceFormat::Gif,
        image::ImageFormat::WebP => SourceFormat::WebP,
        other => SourceFormat::Other(other.extensions_str().first().copied().unwrap_or("image")),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/mod.rs"]
mod tests;
