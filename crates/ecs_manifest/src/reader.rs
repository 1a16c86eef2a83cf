//! Reading manifest files into a single multi-document stream.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ManifestError, ManifestResult};

/// YAML document separator.
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Which kind of manifest files a directory scan picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestMode {
    /// Plain YAML manifests (`.yaml`, `.yml`).
    #[default]
    Plain,
    /// Template manifests (`.tpl`) rendered before parsing.
    Templated,
}

impl ManifestMode {
    /// File extensions matched in this mode.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ManifestMode::Plain => &["yaml", "yml"],
            ManifestMode::Templated => &["tpl"],
        }
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

/// Options controlling how a manifest directory is scanned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    pub mode: ManifestMode,
    /// Descend into subdirectories instead of reading direct children only.
    pub recursive: bool,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: ManifestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Reads one manifest file or a directory of them.
#[derive(Debug, Clone)]
pub struct ManifestReader {
    path: PathBuf,
    options: ReaderOptions,
}

impl ManifestReader {
    /// Create a reader for a file or directory.
    pub fn new(path: impl Into<PathBuf>, options: ReaderOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// The root manifest path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Manifest files a directory scan would read, in read order.
    ///
    /// A single-file path yields just that file.
    pub fn files(&self) -> ManifestResult<Vec<PathBuf>> {
        if !self.path.exists() {
            return Err(ManifestError::NotFound(self.path.clone()));
        }
        if !self.path.is_dir() {
            return Ok(vec![self.path.clone()]);
        }

        let mut files = if self.options.recursive {
            WalkDir::new(&self.path)
                .min_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && self.options.mode.matches(e.path()))
                .map(|e| e.into_path())
                .collect()
        } else {
            let mut files = Vec::new();
            for ext in self.options.mode.extensions() {
                files.extend(glob_sorted(&self.path, &format!("*.{}", ext))?);
            }
            files
        };

        files.sort();
        Ok(files)
    }

    /// Read the raw manifest text.
    ///
    /// A single file is returned unchanged. For a directory, each file is
    /// appended in path order, prefixed with a `---` line unless it already
    /// starts with one.
    pub fn load_raw(&self) -> ManifestResult<String> {
        if !self.path.exists() {
            return Err(ManifestError::NotFound(self.path.clone()));
        }

        if !self.path.is_dir() {
            debug!("Reading manifest {:?}", self.path);
            return Ok(fs::read_to_string(&self.path)?);
        }

        let mut text = String::new();
        for file in self.files()? {
            debug!("Reading manifest {:?}", file);
            let chunk = fs::read_to_string(&file)?;
            append_chunk(&mut text, &chunk);
        }

        Ok(text)
    }
}

/// Append one file's text as its own document chunk.
fn append_chunk(text: &mut String, chunk: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    if !chunk.starts_with(DOCUMENT_SEPARATOR) {
        text.push_str(DOCUMENT_SEPARATOR);
        text.push('\n');
    }
    text.push_str(chunk);
}

/// Direct children of `dir` matching `pattern`, in path order.
pub(crate) fn glob_sorted(dir: &Path, pattern: &str) -> ManifestResult<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full = format!("{}/{}", escaped, pattern);

    let mut files: Vec<PathBuf> = glob::glob(&full)
        .map_err(|e| ManifestError::Glob(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
