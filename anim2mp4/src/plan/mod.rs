/// Percentage-based splitting of a frame sequence.
pub(crate) mod segment;
