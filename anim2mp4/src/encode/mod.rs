//! Video encoding and merging through the system `ffmpeg`/`ffprobe` binaries.
//!
//! Frames are streamed to `ffmpeg` as raw RGBA8 on stdin; merging re-encodes through ffmpeg's
//! `concat` filter so clips of different sizes can be combined.

/// Segment encoder (raw frames in, MP4 out).
pub(crate) mod ffmpeg;
/// Concatenation of finished videos.
pub(crate) mod merge;
/// Numeric-aware filename ordering.
pub(crate) mod natural;
/// Encoder settings.
pub(crate) mod opts;
/// `ffprobe` metadata queries.
pub(crate) mod probe;
