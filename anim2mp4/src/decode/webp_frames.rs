use std::ops::Range;

use crate::decode::{Disposal, FrameSource, RawFrame, SourceFormat};
use crate::foundation::core::{Canvas, Placement};
use crate::foundation::error::{ConvertError, ConvertResult};

const VP8X_ANIMATION: u8 = 0x02;
const VP8X_ALPHA: u8 = 0x10;

const ANMF_DISPOSE_BACKGROUND: u8 = 0x01;
const ANMF_NO_BLEND: u8 = 0x02;

/// A RIFF chunk located inside some byte slice.
#[derive(Clone, Debug)]
pub(crate) struct Chunk {
    pub(crate) fourcc: [u8; 4],
    /// Payload byte range, relative to the slice that was walked.
    pub(crate) range: Range<usize>,
}

/// Walk a flat sequence of RIFF chunks (`fourcc`, little-endian `u32` size, payload, pad byte).
pub(crate) fn walk_chunks(data: &[u8]) -> ConvertResult<Vec<Chunk>> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        let Some(header) = data.get(pos..pos + 8) else {
            return Err(ConvertError::decode("webp: truncated chunk header"));
        };
        let fourcc = [header[0], header[1], header[2], header[3]];
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let start = pos + 8;
        let end = start
            .checked_add(size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                ConvertError::decode(format!(
                    "webp: chunk '{}' overruns its container",
                    String::from_utf8_lossy(&fourcc)
                ))
            })?;
        out.push(Chunk {
            fourcc,
            range: start..end,
        });
        pos = end + (size & 1);
    }
    Ok(out)
}

/// One `ANMF` entry of an animated WebP.
#[derive(Clone, Debug)]
pub(crate) struct AnmfFrame {
    pub(crate) placement: Placement,
    pub(crate) delay_ms: u32,
    pub(crate) disposal: Disposal,
    pub(crate) blend: bool,
    /// Range of the frame's sub-chunks (`ALPH`, `VP8 `/`VP8L`) within the file.
    pub(crate) data: Range<usize>,
}

/// Container-level view of a WebP file.
#[derive(Clone, Debug)]
pub(crate) struct WebpContainer {
    /// Canvas from `VP8X`; absent for simple (lossy/lossless-only) files.
    pub(crate) canvas: Option<Canvas>,
    pub(crate) animated: bool,
    pub(crate) frames: Vec<AnmfFrame>,
}

impl WebpContainer {
    pub(crate) fn parse(bytes: &[u8]) -> ConvertResult<Self> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WEBP" {
            return Err(ConvertError::decode("webp: missing RIFF/WEBP signature"));
        }
        let riff_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let body_end = riff_len.saturating_add(8).min(bytes.len());
        let body = &bytes[12..body_end];

        let mut canvas = None;
        let mut animated = false;
        let mut frames = Vec::new();

        for chunk in walk_chunks(body)? {
            let payload = &body[chunk.range.clone()];
            match &chunk.fourcc {
                b"VP8X" => {
                    if payload.len() < 10 {
                        return Err(ConvertError::decode("webp: VP8X chunk is too short"));
                    }
                    animated = payload[0] & VP8X_ANIMATION != 0;
                    canvas = Some(
                        Canvas::bounded(u24(&payload[4..7]) + 1, u24(&payload[7..10]) + 1)
                            .map_err(|e| ConvertError::decode(format!("webp canvas: {e}")))?,
                    );
                }
                b"ANMF" => {
                    if payload.len() < 16 {
                        return Err(ConvertError::decode("webp: ANMF chunk is too short"));
                    }
                    let flags = payload[15];
                    let data_start = 12 + chunk.range.start + 16;
                    frames.push(AnmfFrame {
                        placement: Placement {
                            x: u24(&payload[0..3]) * 2,
                            y: u24(&payload[3..6]) * 2,
                            width: u24(&payload[6..9]) + 1,
                            height: u24(&payload[9..12]) + 1,
                        },
                        delay_ms: u24(&payload[12..15]),
                        disposal: if flags & ANMF_DISPOSE_BACKGROUND != 0 {
                            Disposal::Background
                        } else {
                            Disposal::Keep
                        },
                        blend: flags & ANMF_NO_BLEND == 0,
                        data: data_start..12 + chunk.range.end,
                    });
                }
                _ => {}
            }
        }

        if animated && canvas.is_none() {
            return Err(ConvertError::decode("webp: animation without a VP8X canvas"));
        }

        Ok(Self {
            canvas,
            animated,
            frames,
        })
    }
}

/// Animated WebP: frames are decoded lazily, one `ANMF` at a time.
pub(crate) struct WebpSource {
    bytes: Vec<u8>,
    canvas: Canvas,
    frames: Vec<AnmfFrame>,
    next: usize,
    warned_no_blend: bool,
}

impl WebpSource {
    pub(crate) fn new(bytes: Vec<u8>, container: WebpContainer) -> ConvertResult<Self> {
        let canvas = container
            .canvas
            .ok_or_else(|| ConvertError::decode("webp: animation without a VP8X canvas"))?;
        Ok(Self {
            bytes,
            canvas,
            frames: container.frames,
            next: 0,
            warned_no_blend: false,
        })
    }
}

impl FrameSource for WebpSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::WebP
    }

    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn frame_count(&self) -> Option<usize> {
        Some(self.frames.len())
    }

    fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    fn next_frame(&mut self) -> ConvertResult<Option<RawFrame>> {
        let Some(frame) = self.frames.get(self.next) else {
            return Ok(None);
        };
        let index = self.next;
        self.next += 1;

        if !frame.blend && !self.warned_no_blend {
            self.warned_no_blend = true;
            tracing::debug!(frame = index, "webp frame requests no-blend; alpha-pasting anyway");
        }

        let tile = decode_anmf_tile(&self.bytes[frame.data.clone()], frame.placement)?;
        Ok(Some(RawFrame {
            tile,
            placement: frame.placement,
            delay_ms: frame.delay_ms,
            disposal: frame.disposal,
        }))
    }
}

/// Decode the bitstream of one `ANMF` frame by re-wrapping it as a standalone still WebP.
fn decode_anmf_tile(frame_data: &[u8], placement: Placement) -> ConvertResult<image::RgbaImage> {
    let sub = walk_chunks(frame_data)?;
    let alpha = sub.iter().find(|c| &c.fourcc == b"ALPH");
    let bitstream = sub
        .iter()
        .find(|c| &c.fourcc == b"VP8 " || &c.fourcc == b"VP8L")
        .ok_or_else(|| ConvertError::decode("webp: ANMF frame has no VP8/VP8L bitstream"))?;

    let standalone = standalone_webp(frame_data, alpha, bitstream, placement);
    let tile = image::load_from_memory_with_format(&standalone, image::ImageFormat::WebP)
        .map_err(|e| ConvertError::decode(format!("webp frame bitstream: {e}")))?
        .to_rgba8();

    if tile.dimensions() != (placement.width, placement.height) {
        return Err(ConvertError::decode(format!(
            "webp frame decoded to {}x{}, but its ANMF header declares {}x{}",
            tile.width(),
            tile.height(),
            placement.width,
            placement.height
        )));
    }
    Ok(tile)
}

fn standalone_webp(
    frame_data: &[u8],
    alpha: Option<&Chunk>,
    bitstream: &Chunk,
    placement: Placement,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(frame_data.len() + 32);
    body.extend_from_slice(b"WEBP");

    // Lossy frames carry alpha in a separate ALPH chunk, which is only legal after VP8X.
    if let Some(alph) = alpha
        && &bitstream.fourcc == b"VP8 "
    {
        let mut vp8x = [0u8; 10];
        vp8x[0] = VP8X_ALPHA;
        vp8x[4..7].copy_from_slice(&put_u24(placement.width - 1));
        vp8x[7..10].copy_from_slice(&put_u24(placement.height - 1));
        push_chunk(&mut body, *b"VP8X", &vp8x);
        push_chunk(&mut body, *b"ALPH", &frame_data[alph.range.clone()]);
    }
    push_chunk(
        &mut body,
        bitstream.fourcc,
        &frame_data[bitstream.range.clone()],
    );

    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

pub(crate) fn push_chunk(out: &mut Vec<u8>, fourcc: [u8; 4], payload: &[u8]) {
    out.extend_from_slice(&fourcc);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if !payload.len().is_multiple_of(2) {
        out.push(0);
    }
}

fn u24(b: &[u8]) -> u32 {
    u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16)
}

pub(crate) fn put_u24(v: u32) -> [u8; 3] {
    [v as u8, (v >> 8) as u8, (v >> 16) as u8]
}

#[cfg(test)]
#[path = "../../tests/unit/decode/webp_frames.rs"]
mod tests;
