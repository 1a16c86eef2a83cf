//! Template rendering of raw manifest text.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use minijinja::{AutoEscape, Environment, ErrorKind};
use tracing::{debug, info};

use crate::error::{ManifestError, ManifestResult};
use crate::vars::{VariableSet, VariableStore};

/// Where variables and includes come from when rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Variable files or directories, loaded in order.
    pub variable_sources: Vec<PathBuf>,
    /// Inline `key=value` overrides applied after every file.
    pub overrides: Vec<String>,
    /// Extra include directories searched after the manifest's own directory.
    pub search_paths: Vec<PathBuf>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.variable_sources.push(source.into());
        self
    }

    pub fn with_override(mut self, assignment: impl Into<String>) -> Self {
        self.overrides.push(assignment.into());
        self
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Build the variable context: files first, overrides last.
    pub fn variables(&self) -> ManifestResult<VariableSet> {
        VariableStore::new(self.variable_sources.iter().cloned())
            .load_with_overrides(self.overrides.as_slice())
    }
}

#[derive(Debug)]
struct CachedSource {
    modified: SystemTime,
    source: String,
}

/// Include sources keyed by path, reused while the file's mtime is unchanged.
#[derive(Debug, Default)]
struct SourceCache {
    entries: Mutex<HashMap<PathBuf, CachedSource>>,
}

impl SourceCache {
    fn read(&self, path: &Path) -> io::Result<String> {
        let modified = fs::metadata(path)?.modified()?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = entries.get(path) {
            if cached.modified == modified {
                return Ok(cached.source.clone());
            }
            debug!("Template {:?} changed on disk, reloading", path);
        }

        let source = fs::read_to_string(path)?;
        entries.insert(
            path.to_path_buf(),
            CachedSource {
                modified,
                source: source.clone(),
            },
        );
        Ok(source)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Renders manifest text as a Jinja template.
///
/// Includes are looked up in each search directory in order; the first
/// directory containing the file wins.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    search_paths: Vec<PathBuf>,
    cache: Arc<SourceCache>,
}

impl TemplateRenderer {
    /// Create a renderer searching the given include directories.
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: Arc::new(SourceCache::default()),
        }
    }

    /// Create a renderer for a root manifest path.
    ///
    /// The directory containing the (resolved) manifest path is searched
    /// first, followed by `extra` in order.
    pub fn for_manifest(manifest_path: &Path, extra: &[PathBuf]) -> ManifestResult<Self> {
        if !manifest_path.exists() {
            return Err(ManifestError::NotFound(manifest_path.to_path_buf()));
        }
        let resolved = manifest_path.canonicalize()?;
        let base_dir = resolved
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| resolved.clone());

        let mut search_paths = vec![base_dir];
        search_paths.extend(extra.iter().cloned());
        Ok(Self::new(search_paths))
    }

    /// Include directories, in lookup order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Render `raw` once against `vars`.
    pub fn render(&self, raw: &str, vars: &VariableSet) -> ManifestResult<String> {
        let missing = Arc::new(Mutex::new(Vec::<String>::new()));

        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        {
            let search_paths = self.search_paths.clone();
            let cache = Arc::clone(&self.cache);
            let missing = Arc::clone(&missing);
            env.set_loader(move |name| {
                let pieces = split_template_path(name);
                for dir in &search_paths {
                    let candidate = pieces.iter().fold(dir.clone(), |path, piece| path.join(piece));
                    if candidate.is_file() {
                        debug!("Resolved include {} to {:?}", name, candidate);
                        return cache.read(&candidate).map(Some).map_err(|e| {
                            minijinja::Error::new(
                                ErrorKind::InvalidOperation,
                                format!("failed to read {}: {}", candidate.display(), e),
                            )
                        });
                    }
                }
                missing
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(name.to_string());
                Ok(None)
            });
        }

        info!("Rendering manifest template with {} variables", vars.len());
        env.render_str(raw, vars).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                let name = missing
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .last()
                    .cloned()
                    .unwrap_or_else(|| e.to_string());
                ManifestError::TemplateNotFound(name)
            } else {
                ManifestError::Rendering(e.to_string())
            }
        })
    }

    /// Build the variable context from `options`, then render.
    pub fn render_with(&self, raw: &str, options: &RenderOptions) -> ManifestResult<String> {
        let vars = options.variables()?;
        self.render(raw, &vars)
    }
}

/// Split an include name into path pieces, dropping empty and `.` pieces.
fn split_template_path(name: &str) -> Vec<&str> {
    name.split('/')
        .filter(|piece| !piece.is_empty() && *piece != ".")
        .collect()
}
