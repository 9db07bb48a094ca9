use harvest_core::SinkError;

/// Fatal transformer errors.
///
/// Unresolvable references are not errors; they skip the record and land in
/// the [`crate::TransformReport`]. Only a failed sink write during fallback
/// creation stops a transformer.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("fallback entity could not be written: {0}")]
    Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
