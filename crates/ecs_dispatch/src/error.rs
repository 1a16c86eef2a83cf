//! Error types for handler dispatch.

use thiserror::Error;

use ecs_manifest::{ManifestError, SchemaError};

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur while resolving or using handlers.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("Response error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}
