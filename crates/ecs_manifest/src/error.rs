//! Error types for manifest operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while loading, rendering or parsing manifests.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Template not found in any search path: {0}")]
    TemplateNotFound(String),

    #[error("Template rendering failed: {0}")]
    Rendering(String),

    #[error("YAML parse error in document {document}{}: {message}", location(.line, .column))]
    Parse {
        document: usize,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error("Invalid resource in document {document}: {source}")]
    Schema {
        document: usize,
        #[source]
        source: SchemaError,
    },

    #[error("Invalid variable override (expected key=value): {0}")]
    InvalidOverride(String),

    #[error("Invalid path query '{expression}': {message}")]
    InvalidQuery { expression: String, message: String },

    #[error("{} manifest errors: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<ManifestError>),

    #[error("Invalid glob pattern: {0}")]
    Glob(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ManifestError {
    /// Whether this error (or every error it groups) is a schema violation.
    pub fn is_schema(&self) -> bool {
        match self {
            ManifestError::Schema { .. } => true,
            ManifestError::Multiple(errors) => errors.iter().all(ManifestError::is_schema),
            _ => false,
        }
    }

    /// The schema errors carried by this error, flattened.
    pub fn schema_errors(&self) -> Vec<&SchemaError> {
        match self {
            ManifestError::Schema { source, .. } => vec![source],
            ManifestError::Multiple(errors) => {
                errors.iter().flat_map(ManifestError::schema_errors).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// A document that does not satisfy the resource schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("`{field}` is missing")]
    MissingField { field: String },

    #[error("`{field}` is invalid: {message}")]
    InvalidField { field: String, message: String },

    #[error("unsupported apiVersion `{found}`, only `v1` is supported")]
    UnsupportedApiVersion { found: String },

    #[error("no value matched `{path}`")]
    NoMatch { path: String },
}

impl SchemaError {
    pub fn missing(field: impl Into<String>) -> Self {
        SchemaError::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The field or path this error refers to.
    pub fn field(&self) -> &str {
        match self {
            SchemaError::MissingField { field } | SchemaError::InvalidField { field, .. } => field,
            SchemaError::UnsupportedApiVersion { .. } => "apiVersion",
            SchemaError::NoMatch { path } => path,
        }
    }
}

fn location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" at line {} column {}", line, column),
        (Some(line), None) => format!(" at line {}", line),
        _ => String::new(),
    }
}

fn join_errors(errors: &[ManifestError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
