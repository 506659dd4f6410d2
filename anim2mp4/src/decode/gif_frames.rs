use std::io::Cursor;

use crate::decode::{Disposal, FrameSource, RawFrame, SourceFormat};
use crate::foundation::core::{Canvas, Placement};
use crate::foundation::error::{ConvertError, ConvertResult};

/// GIF frames decoded as palette indices and resolved to RGBA8 here, so frames without a local
/// color table can fall back to the global one.
pub(crate) struct GifSource {
    decoder: gif::Decoder<Cursor<Vec<u8>>>,
    canvas: Canvas,
    global_palette: Option<Vec<u8>>,
    frame_count: Option<usize>,
}

impl GifSource {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> ConvertResult<Self> {
        let frame_count = count_frames(&bytes);
        let decoder = decode_options()
            .read_info(Cursor::new(bytes))
            .map_err(|e| ConvertError::decode(format!("read gif header: {e}")))?;
        let canvas = Canvas::bounded(u32::from(decoder.width()), u32::from(decoder.height()))
            .map_err(|e| ConvertError::decode(format!("gif logical screen: {e}")))?;
        let global_palette = decoder.global_palette().map(<[u8]>::to_vec);

        Ok(Self {
            decoder,
            canvas,
            global_palette,
            frame_count,
        })
    }
}

impl FrameSource for GifSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Gif
    }

    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn frame_count(&self) -> Option<usize> {
        self.frame_count
    }

    fn is_animated(&self) -> bool {
        self.frame_count.is_none_or(|n| n > 1)
    }

    fn next_frame(&mut self) -> ConvertResult<Option<RawFrame>> {
        let frame = match self.decoder.read_next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(e) => return Err(ConvertError::decode(format!("gif frame: {e}"))),
        };

        let palette = frame
            .palette
            .as_deref()
            .or(self.global_palette.as_deref())
            .ok_or_else(|| {
                ConvertError::decode("gif frame has neither a local nor a global color table")
            })?;

        let width = u32::from(frame.width);
        let height = u32::from(frame.height);
        let rgba = indexed_to_rgba8(&frame.buffer, palette, frame.transparent);
        let tile = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            ConvertError::decode(format!(
                "gif frame data does not fill its {width}x{height} descriptor"
            ))
        })?;

        Ok(Some(RawFrame {
            tile,
            placement: Placement {
                x: u32::from(frame.left),
                y: u32::from(frame.top),
                width,
                height,
            },
            delay_ms: u32::from(frame.delay) * 10,
            disposal: match frame.dispose {
                gif::DisposalMethod::Background => Disposal::Background,
                gif::DisposalMethod::Previous => Disposal::Previous,
                gif::DisposalMethod::Any | gif::DisposalMethod::Keep => Disposal::Keep,
            },
        }))
    }
}

fn decode_options() -> gif::DecodeOptions {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    opts
}

/// Walk frame descriptors only (image data is skipped) to learn the frame count up front.
fn count_frames(bytes: &[u8]) -> Option<usize> {
    let mut decoder = decode_options().read_info(bytes).ok()?;
    let mut n = 0usize;
    loop {
        match decoder.next_frame_info() {
            Ok(Some(_)) => n += 1,
            Ok(None) => return Some(n),
            Err(e) => {
                tracing::debug!(error = %e, frames_seen = n, "gif frame count unavailable");
                return None;
            }
        }
    }
}

/// Resolve palette indices to straight-alpha RGBA8.
///
/// The transparent index maps to alpha 0; indices past the end of the palette map to opaque
/// black.
pub(crate) fn indexed_to_rgba8(indices: &[u8], palette: &[u8], transparent: Option<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(indices.len() * 4);
    for &idx in indices {
        if transparent == Some(idx) {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let off = usize::from(idx) * 3;
        match palette.get(off..off + 3) {
            Some(rgb) => out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]),
            None => out.extend_from_slice(&[0, 0, 0, 255]),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/decode/gif_frames.rs"]
mod tests;
