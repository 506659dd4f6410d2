/// Full/partial classification and animation metadata.
pub(crate) mod inspector;
