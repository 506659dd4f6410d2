use std::io::Cursor;

use crate::decode::{FrameSource, RawFrame, SourceFormat, source_format_of};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ConvertError, ConvertResult};

/// A single still image. Yields exactly one full-canvas frame.
pub(crate) struct StillSource {
    bytes: Option<Vec<u8>>,
    format: image::ImageFormat,
    canvas: Canvas,
}

impl StillSource {
    pub(crate) fn from_bytes(bytes: Vec<u8>, format: image::ImageFormat) -> ConvertResult<Self> {
        let (width, height) = image::ImageReader::with_format(Cursor::new(&bytes), format)
            .into_dimensions()
            .map_err(|e| ConvertError::decode(format!("read {format:?} header: {e}")))?;
        let canvas = Canvas::bounded(width, height)
            .map_err(|e| ConvertError::decode(format!("{format:?} image: {e}")))?;
        Ok(Self {
            bytes: Some(bytes),
            format,
            canvas,
        })
    }
}

impl FrameSource for StillSource {
    fn format(&self) -> SourceFormat {
        source_format_of(self.format)
    }

    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn frame_count(&self) -> Option<usize> {
        Some(1)
    }

    fn is_animated(&self) -> bool {
        false
    }

    fn next_frame(&mut self) -> ConvertResult<Option<RawFrame>> {
        let Some(bytes) = self.bytes.take() else {
            return Ok(None);
        };
        let tile = image::load_from_memory_with_format(&bytes, self.format)
            .map_err(|e| ConvertError::decode(format!("decode {:?} image: {e}", self.format)))?
            .to_rgba8();
        Ok(Some(RawFrame::at(tile, 0, 0, 0)))
    }
}
