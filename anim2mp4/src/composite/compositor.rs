use image::RgbaImage;

use crate::decode::{Disposal, FrameSource, RawFrame};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ConvertError, ConvertResult};
use crate::foundation::math::mask_paste_rgba8;
use crate::inspect::inspector::UpdateMode;

/// Running canvas folded over an animation's frames in temporal order.
///
/// The canvas is seeded from the first frame, so [`Compositor::current`] is always a valid
/// canvas-sized bitmap. Each [`Compositor::apply`] produces the next composited frame and makes
/// it the new running canvas.
#[derive(Debug)]
pub struct Compositor {
    mode: UpdateMode,
    canvas: Canvas,
    last_frame: RgbaImage,
    ignored_disposal: bool,
}

impl Compositor {
    /// Seed the running canvas with `first` converted to canvas-sized RGBA.
    pub fn new(mode: UpdateMode, canvas: Canvas, first: &RawFrame) -> ConvertResult<Self> {
        check_tile(first)?;
        Ok(Self {
            mode,
            canvas,
            last_frame: render_standalone(canvas, first),
            ignored_disposal: false,
        })
    }

    /// The most recently produced frame (the seed before any `apply`).
    pub fn current(&self) -> &RgbaImage {
        &self.last_frame
    }

    /// Consume the compositor, returning the running canvas.
    pub fn into_current(self) -> RgbaImage {
        self.last_frame
    }

    /// Produce the composited frame for `frame`.
    ///
    /// In [`UpdateMode::Full`] the result is the frame alone on a transparent canvas. In
    /// [`UpdateMode::Partial`] the tile is pasted onto the running canvas with its own alpha as
    /// the mask, so transparent tile pixels leave the accumulated pixels untouched.
    pub fn apply(&mut self, frame: &RawFrame) -> ConvertResult<&RgbaImage> {
        check_tile(frame)?;
        match self.mode {
            UpdateMode::Full => self.last_frame = render_standalone(self.canvas, frame),
            UpdateMode::Partial => {
                if frame.disposal != Disposal::Keep && !self.ignored_disposal {
                    self.ignored_disposal = true;
                    tracing::debug!(
                        disposal = ?frame.disposal,
                        "disposal method not modelled; keeping accumulated canvas"
                    );
                }
                blit(&mut self.last_frame, frame, mask_paste_rgba8);
            }
        }
        Ok(&self.last_frame)
    }
}

/// Composite every frame of `source` in memory.
///
/// Returns an empty vector when the source yields no frames.
pub fn composite_all(
    source: &mut dyn FrameSource,
    mode: UpdateMode,
) -> ConvertResult<Vec<RgbaImage>> {
    let canvas = source.canvas();
    let Some(first) = source.next_frame()? else {
        return Ok(Vec::new());
    };
    let mut compositor = Compositor::new(mode, canvas, &first)?;
    let mut out = vec![compositor.current().clone()];
    while let Some(frame) = source.next_frame()? {
        out.push(compositor.apply(&frame)?.clone());
    }
    Ok(out)
}

/// The frame's pixels alone on a transparent canvas-sized bitmap.
pub(crate) fn render_standalone(canvas: Canvas, frame: &RawFrame) -> RgbaImage {
    let mut out = RgbaImage::new(canvas.width, canvas.height);
    blit(&mut out, frame, |d, s| d.copy_from_slice(s));
    out
}

fn check_tile(frame: &RawFrame) -> ConvertResult<()> {
    let p = frame.placement;
    if frame.tile.dimensions() != (p.width, p.height) {
        return Err(ConvertError::extraction(format!(
            "unexpected tile geometry: {}x{} pixels for a {}x{} placement",
            frame.tile.width(),
            frame.tile.height(),
            p.width,
            p.height
        )));
    }
    Ok(())
}

/// Apply `op(dst_px, src_px)` over the part of the tile that lies on the canvas.
fn blit(dst: &mut RgbaImage, frame: &RawFrame, op: impl Fn(&mut [u8], &[u8])) {
    let canvas = Canvas {
        width: dst.width(),
        height: dst.height(),
    };
    let Some((x0, y0, x1, y1)) = frame.placement.clip_to(canvas) else {
        return;
    };

    let dst_stride = canvas.width as usize * 4;
    let src_stride = frame.tile.width() as usize * 4;
    let span = (x1 - x0) as usize * 4;
    let src = frame.tile.as_raw();
    let out: &mut [u8] = dst;

    for y in y0..y1 {
        let s = (y - frame.placement.y) as usize * src_stride;
        let d = y as usize * dst_stride + x0 as usize * 4;
        let dst_row = &mut out[d..d + span];
        let src_row = &src[s..s + span];
        for (dp, sp) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            op(dp, sp);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
