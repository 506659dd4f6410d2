use crate::foundation::error::{ConvertError, ConvertResult};

/// Split ratio meaning "do not split".
pub const NO_SPLIT: u32 = 100;

/// Half-open frame-index range `[start, end)` of a frame sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Inclusive start index.
    pub start: usize,
    /// Exclusive end index.
    pub end: usize,
}

impl Segment {
    /// Number of frames in the segment.
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Empty segments are skipped by encoders, not treated as errors.
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// The items of `seq` covered by this segment.
    pub fn slice<T>(self, seq: &[T]) -> &[T] {
        &seq[self.start..self.end]
    }
}

/// Split a sequence of `len` frames at `split_ratio` percent.
///
/// `split_index = floor(len * split_ratio / 100)`. The first segment is `[0, split_index)`; a
/// second segment `[split_index, len)` follows only when `split_index < len`. The first segment
/// may be empty for small ratios.
pub fn split(len: usize, split_ratio: u32) -> ConvertResult<Vec<Segment>> {
    if split_ratio == 0 || split_ratio > NO_SPLIT {
        return Err(ConvertError::validation(format!(
            "split ratio must be in 1..=100, got {split_ratio}"
        )));
    }

    let split_index = len * split_ratio as usize / 100;
    let mut segments = vec![Segment {
        start: 0,
        end: split_index,
    }];
    if split_index < len {
        segments.push(Segment {
            start: split_index,
            end: len,
        });
    }
    Ok(segments)
}

#[cfg(test)]
#[path = "../../tests/unit/plan/segment.rs"]
mod tests;
