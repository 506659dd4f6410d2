use crate::foundation::error::{ConvertError, ConvertResult};

/// 0-based frame index in animation temporal order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub usize);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ConvertResult<Self> {
        if den == 0 {
            return Err(ConvertError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ConvertError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole frames per second.
    pub fn whole(fps: u32) -> ConvertResult<Self> {
        Self::new(fps, 1)
    }

    /// `num/den` form accepted by ffmpeg's `-r` and `fps=` options.
    pub fn to_ffmpeg_arg(self) -> String {
        format!("{}/{}", self.num, self.den)
    }
}

/// Largest RGBA8 frame buffer accepted from a source header (256 MiB, e.g. 8192x8192).
pub const MAX_CANVAS_BYTES: u64 = 256 * 1024 * 1024;

/// Full animation canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> ConvertResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConvertError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Create a canvas whose RGBA8 buffer stays within [`MAX_CANVAS_BYTES`].
    ///
    /// Container headers are untrusted; this is checked before any canvas-sized allocation.
    pub fn bounded(width: u32, height: u32) -> ConvertResult<Self> {
        let canvas = Self::new(width, height)?;
        let bytes = u64::from(width) * u64::from(height) * 4;
        if bytes > MAX_CANVAS_BYTES {
            return Err(ConvertError::validation(format!(
                "canvas {width}x{height} needs {bytes} bytes per frame, limit is {MAX_CANVAS_BYTES}"
            )));
        }
        Ok(canvas)
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Placement rectangle of a decoded tile within the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Left edge in canvas pixels.
    pub x: u32,
    /// Top edge in canvas pixels.
    pub y: u32,
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
}

impl Placement {
    /// A placement covering the whole `canvas` from the origin.
    pub fn full(canvas: Canvas) -> Self {
        Self {
            x: 0,
            y: 0,
            width: canvas.width,
            height: canvas.height,
        }
    }

    /// Return `true` when the tile size equals the canvas size.
    ///
    /// Only the size is compared; the origin does not take part in full/partial classification.
    pub fn covers(self, canvas: Canvas) -> bool {
        self.width == canvas.width && self.height == canvas.height
    }

    /// Intersection with `canvas` as `(x0, y0, x1, y1)`, or `None` when nothing is visible.
    pub fn clip_to(self, canvas: Canvas) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x.saturating_add(self.width).min(canvas.width);
        let y1 = self.y.saturating_add(self.height).min(canvas.height);
        if self.x >= x1 || self.y >= y1 {
            return None;
        }
        Some((self.x, self.y, x1, y1))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
