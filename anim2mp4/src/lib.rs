//! anim2mp4 converts animated WebP and GIF images into MP4 video.
//!
//! The crate turns an animation into a sequence of full RGBA frames, splits it into at most
//! two segments and streams each segment to the system `ffmpeg` binary.
//!
//! # Pipeline overview
//!
//! 1. **Inspect**: `path -> AnimationInfo` (canvas, frame count, duration, full/partial updates)
//! 2. **Composite**: `FrameSource -> FrameSequence` (partial tiles alpha-pasted onto a running
//!    canvas, each result persisted as `<stem>-<index:04>.png`)
//! 3. **Plan**: `split(len, ratio) -> Vec<Segment>` (percentage split into one or two ranges)
//! 4. **Encode**: `Segment -> <stem>_part<N>.mp4` via `ffmpeg`, optionally merged afterwards
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **All-or-nothing per file**: a failed extraction or encode leaves no partial output behind.
//! - **Straight-alpha RGBA8** throughout; alpha is flattened over a background colour only when
//!   frames are handed to the encoder.
//! - **Files are independent**: one file failing never aborts its siblings in a batch.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod composite;
mod convert;
mod decode;
mod encode;
mod foundation;
mod inspect;
mod plan;

#[cfg(test)]
#[path = "../tests/unit/fixtures.rs"]
mod fixtures;

pub use composite::compositor::{Compositor, composite_all};
pub use composite::extract::{
    CompositedFrame, FrameSequence, extract_frames, extract_from_source, frame_file_name,
};
pub use convert::batch::{
    BatchReport, FileReport, INPUT_EXTENSIONS, convert_batch, discover_inputs,
};
pub use convert::pipeline::{ConvertOpts, FileOutcome, convert_file, segment_output_path};
pub use decode::{Disposal, FrameSource, RawFrame, SourceFormat, open_source};
pub use encode::ffmpeg::{
    SegmentConfig, SegmentEncoder, encode_segment, ensure_parent_dir, is_ffmpeg_on_path,
    is_ffprobe_on_path,
};
pub use encode::merge::merge_videos;
pub use encode::natural::{natural_cmp, natural_sort};
pub use encode::opts::EncoderOpts;
pub use encode::probe::{VideoProbe, probe};
pub use foundation::core::{Canvas, Fps, FrameIndex, Placement};
pub use foundation::error::{ConvertError, ConvertResult};
pub use inspect::inspector::{AnimationInfo, UpdateMode, inspect, inspect_source};
pub use plan::segment::{NO_SPLIT, Segment, split};
