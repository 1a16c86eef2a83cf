//! End-to-end manifest loading: read, render, parse, build descriptors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::cluster::ClusterContext;
use crate::error::{ManifestError, ManifestResult};
use crate::parser::{Document, ManifestParser};
use crate::reader::{ManifestMode, ManifestReader, ReaderOptions};
use crate::renderer::{RenderOptions, TemplateRenderer};
use crate::resource::ResourceObject;

/// What to do when a document fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first invalid document.
    #[default]
    FailFast,
    /// Validate every document and report all failures together.
    CollectAll,
}

/// Options for a full load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub reader: ReaderOptions,
    /// Rendering settings; `Some` switches to templated manifests.
    pub render: Option<RenderOptions>,
    pub error_policy: ErrorPolicy,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `.tpl` manifests and render them before parsing.
    pub fn templated(mut self, render: RenderOptions) -> Self {
        self.reader.mode = ManifestMode::Templated;
        self.render = Some(render);
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.reader.recursive = recursive;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

/// Loads a manifest file or directory into resource descriptors.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    path: PathBuf,
    options: LoadOptions,
}

impl ManifestLoader {
    pub fn new(path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// The manifest text after reading and, when templated, rendering.
    pub fn load_text(&self) -> ManifestResult<String> {
        let raw = ManifestReader::new(&self.path, self.options.reader).load_raw()?;

        match &self.options.render {
            Some(render) => {
                let renderer = TemplateRenderer::for_manifest(&self.path, &render.search_paths)?;
                renderer.render_with(&raw, render)
            }
            None => Ok(raw),
        }
    }

    /// Every non-empty document in the manifest text.
    pub fn load_documents(&self) -> ManifestResult<Vec<Document>> {
        let text = self.load_text()?;
        ManifestParser::parse_all(&text)
    }

    /// Build one descriptor per document, honouring the error policy.
    pub fn load_resources(
        &self,
        cluster: Arc<ClusterContext>,
    ) -> ManifestResult<Vec<ResourceObject>> {
        info!("Loading manifests from {:?}", self.path);
        let text = self.load_text()?;
        build_resources(&text, cluster, self.options.error_policy)
    }
}

/// Parse `text` and build descriptors document by document.
///
/// Syntax errors always abort. Schema errors abort under
/// [`ErrorPolicy::FailFast`] and are gathered into
/// [`ManifestError::Multiple`] under [`ErrorPolicy::CollectAll`].
pub fn build_resources(
    text: &str,
    cluster: Arc<ClusterContext>,
    policy: ErrorPolicy,
) -> ManifestResult<Vec<ResourceObject>> {
    let mut resources = Vec::new();
    let mut errors = Vec::new();

    for document in ManifestParser::new(text) {
        let document = match document {
            Ok(document) => document,
            Err(e) if errors.is_empty() => return Err(e),
            Err(e) => {
                errors.push(e);
                break;
            }
        };

        match ResourceObject::from_document(Arc::clone(&cluster), &document.value) {
            Ok(resource) => {
                info!("Loaded {}", resource.identity());
                resources.push(resource);
            }
            Err(source) => {
                let error = ManifestError::Schema {
                    document: document.index,
                    source,
                };
                if policy == ErrorPolicy::FailFast {
                    return Err(error);
                }
                warn!("{}", error);
                errors.push(error);
            }
        }
    }

    match errors.len() {
        0 => Ok(resources),
        1 => Err(errors.remove(0)),
        _ => Err(ManifestError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    fn cluster() -> Arc<ClusterContext> {
        Arc::new(ClusterContext::new("test"))
    }

    const MIXED: &str = "\
apiVersion: v1
kind: Service
metadata: {name: web}
spec: {}
---
apiVersion: v2
kind: Service
metadata: {name: old}
spec: {}
---
apiVersion: v1
kind: Secret
metadata: {name: db}
---
apiVersion: v1
kind: Secret
metadata: {name: api}
spec: {}
";

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        let err = build_resources(MIXED, cluster(), ErrorPolicy::FailFast).unwrap_err();
        match err {
            ManifestError::Schema { document, source } => {
                assert_eq!(document, 1);
                assert!(matches!(source, SchemaError::UnsupportedApiVersion { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_collect_all_reports_every_error() {
        let err = build_resources(MIXED, cluster(), ErrorPolicy::CollectAll).unwrap_err();
        assert!(err.is_schema());
        let fields: Vec<_> = err.schema_errors().iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["apiVersion", "spec"]);
    }

    #[test]
    fn test_all_valid() {
        let text = "apiVersion: v1\nkind: Service\nmetadata: {name: web}\nspec: {}\n";
        let resources = build_resources(text, cluster(), ErrorPolicy::CollectAll).unwrap();
        assert_eq!(resources.len(), 1);
    }
}
