/// Convenience result type used across anim2mp4.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Top-level error taxonomy used by the conversion APIs.
///
/// An animation with one frame or fewer is not an error: extraction returns an empty
/// [`FrameSequence`](crate::FrameSequence) instead.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    /// Invalid caller-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// The source could not be opened or parsed as a supported image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Compositing or persisting frames failed mid-sequence. No frame files are left behind.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The external encoder failed; carries its diagnostic output.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The external merge step failed; carries its diagnostic output.
    #[error("merge error: {0}")]
    Merge(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConvertError {
    /// Build a [`ConvertError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ConvertError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ConvertError::Extraction`] value.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Build a [`ConvertError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`ConvertError::Merge`] value.
    pub fn merge(msg: impl Into<String>) -> Self {
        Self::Merge(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
