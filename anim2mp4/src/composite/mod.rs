//! Reconstruction of full-canvas RGBA frames from full or delta-encoded sources.

/// The running-canvas fold over decoded frames.
pub(crate) mod compositor;
/// Persisting composited frames as numbered PNG files, all-or-nothing.
pub(crate) mod extract;
