//! Per-file conversion pipeline and multi-file batches.

/// Batches of files, optionally in parallel.
pub(crate) mod batch;
/// One source file to one or two MP4 segments.
pub(crate) mod pipeline;
