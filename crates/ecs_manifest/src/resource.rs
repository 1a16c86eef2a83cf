//! Validated resource descriptors built from parsed documents.

use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::cluster::ClusterContext;
use crate::error::SchemaError;
use crate::query::PathQuery;

/// The only manifest schema version accepted.
pub const SUPPORTED_API_VERSION: &str = "v1";

/// Reported as the found version when a document has no `apiVersion`.
const MISSING_API_VERSION: &str = "<missing>";

/// Queries for the fixed document fields, compiled once per process.
struct DocumentQueries {
    kind: PathQuery,
    name: PathQuery,
    spec: PathQuery,
    tags: PathQuery,
    api_version: PathQuery,
}

static QUERIES: LazyLock<DocumentQueries> = LazyLock::new(|| {
    let compile = |expr: &str| PathQuery::parse(expr).expect("document query is valid");
    DocumentQueries {
        kind: compile("kind"),
        name: compile("metadata.name"),
        spec: compile("spec"),
        tags: compile("metadata.tags"),
        api_version: compile("apiVersion"),
    }
});

/// One manifest document, validated and projected into typed fields.
///
/// A descriptor only exists for documents that carry `kind`,
/// `metadata.name`, `spec` and `apiVersion: v1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceObject {
    kind: String,
    name: String,
    identity: String,
    api_version: String,
    tags: Vec<String>,
    /// The document's `metadata` without `name`.
    metadata: Mapping,
    spec: Value,
    #[serde(skip)]
    cluster: Arc<ClusterContext>,
}

impl ResourceObject {
    /// Validate `document` and build its descriptor.
    ///
    /// The document itself is left untouched.
    pub fn from_document(
        cluster: Arc<ClusterContext>,
        document: &Value,
    ) -> Result<Self, SchemaError> {
        let queries = &*QUERIES;

        let kind = required_string(&queries.kind, document)?;
        let name = required_string(&queries.name, document)?;
        let spec = required(&queries.spec, document)?.clone();
        let tags = match queries.tags.first(document) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => string_list(queries.tags.expression(), value)?,
        };

        let metadata: Mapping = document
            .get("metadata")
            .and_then(Value::as_mapping)
            .map(|m| {
                m.iter()
                    .filter(|(key, _)| key.as_str() != Some("name"))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let api_version = queries.api_version.first(document);
        if api_version.and_then(Value::as_str) != Some(SUPPORTED_API_VERSION) {
            let found = match api_version {
                None | Some(Value::Null) => MISSING_API_VERSION.to_string(),
                Some(value) => scalar_string(value).unwrap_or_else(|| format!("{:?}", value)),
            };
            return Err(SchemaError::UnsupportedApiVersion { found });
        }

        let identity = format!("{}: {}", kind, name);
        debug!("Built descriptor {}", identity);

        Ok(Self {
            kind,
            name,
            identity,
            api_version: SUPPORTED_API_VERSION.to_string(),
            tags,
            metadata,
            spec,
            cluster,
        })
    }

    /// Resource kind; selects the handler.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"<kind>: <name>"`, used to identify the resource in output.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn metadata(&self) -> &Mapping {
        &self.metadata
    }

    /// Kind-specific payload, passed through unmodified.
    pub fn spec(&self) -> &Value {
        &self.spec
    }

    pub fn cluster(&self) -> &Arc<ClusterContext> {
        &self.cluster
    }
}

impl fmt::Display for ResourceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity)
    }
}

/// First match of `query`; null counts as missing.
fn required<'a>(query: &PathQuery, document: &'a Value) -> Result<&'a Value, SchemaError> {
    match query.first(document) {
        None | Some(Value::Null) => Err(SchemaError::missing(query.expression())),
        Some(value) => Ok(value),
    }
}

fn required_string(query: &PathQuery, document: &Value) -> Result<String, SchemaError> {
    let value = required(query, document)?;
    scalar_string(value)
        .ok_or_else(|| SchemaError::invalid(query.expression(), "expected a string"))
}

fn string_list(field: &str, value: &Value) -> Result<Vec<String>, SchemaError> {
    let items = value
        .as_sequence()
        .ok_or_else(|| SchemaError::invalid(field, "expected a list of strings"))?;

    items
        .iter()
        .map(|item| {
            scalar_string(item)
                .ok_or_else(|| SchemaError::invalid(field, "expected a list of strings"))
        })
        .collect()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
