//! Variable files (`key=value` per line) feeding the template context.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ManifestError, ManifestResult};
use crate::reader::glob_sorted;

/// Extension recognized for variable files inside a directory source.
pub const VARIABLE_FILE_PATTERN: &str = "*.env";

/// Variables available to the template renderer.
///
/// Later insertions replace earlier ones for the same key.
pub type VariableSet = BTreeMap<String, String>;

/// Loads variables from files and directories.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    sources: Vec<PathBuf>,
}

impl VariableStore {
    /// Create a store reading the given sources in order.
    pub fn new<I, P>(sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Load every source into a single variable set.
    ///
    /// Directory sources contribute their direct `*.env` children in path
    /// order; any other source is read as a single file.
    pub fn load(&self) -> ManifestResult<VariableSet> {
        let mut vars = VariableSet::new();

        for source in &self.sources {
            if !source.exists() {
                return Err(ManifestError::NotFound(source.clone()));
            }

            if source.is_dir() {
                for file in glob_sorted(source, VARIABLE_FILE_PATTERN)? {
                    read_variable_file(&file, &mut vars)?;
                }
            } else {
                read_variable_file(source, &mut vars)?;
            }
        }

        Ok(vars)
    }

    /// Load every source, then apply inline `key=value` overrides on top.
    pub fn load_with_overrides<S: AsRef<str>>(&self, overrides: &[S]) -> ManifestResult<VariableSet> {
        let mut vars = self.load()?;
        apply_overrides(&mut vars, overrides)?;
        Ok(vars)
    }
}

/// Apply inline `key=value` overrides, which always win over file values.
pub fn apply_overrides<S: AsRef<str>>(vars: &mut VariableSet, overrides: &[S]) -> ManifestResult<()> {
    for raw in overrides {
        let raw = raw.as_ref();
        let (key, value) =
            split_assignment(raw).ok_or_else(|| ManifestError::InvalidOverride(raw.to_string()))?;
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(())
}

/// Split on the first `=`; everything after it is the value, verbatim.
pub fn split_assignment(line: &str) -> Option<(&str, &str)> {
    line.split_once('=')
}

fn read_variable_file(path: &Path, vars: &mut VariableSet) -> ManifestResult<()> {
    debug!("Reading variables from {:?}", path);
    let content = fs::read_to_string(path)?;

    for (number, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        match split_assignment(line) {
            Some((key, value)) => {
                vars.insert(key.to_string(), value.to_string());
            }
            None => warn!(
                "Skipping line {} in {:?}: expected key=value",
                number + 1,
                path
            ),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_value_keeps_extra_equals() {
        assert_eq!(
            split_assignment("DATABASE_URL=postgres://u:p@h/db?sslmode=require"),
            Some(("DATABASE_URL", "postgres://u:p@h/db?sslmode=require"))
        );
        assert_eq!(split_assignment("EMPTY="), Some(("EMPTY", "")));
        assert_eq!(split_assignment("no-separator"), None);
    }

    #[test]
    fn test_last_line_wins_within_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("app.env");
        fs::write(&file, "IMAGE=nginx:1.0\n\nIMAGE=nginx:1.1\nbroken line\n").unwrap();

        let vars = VariableStore::new([&file]).load().unwrap();
        assert_eq!(vars.get("IMAGE").map(String::as_str), Some("nginx:1.1"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_directory_reads_only_env_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.env"), "A=1\n").unwrap();
        fs::write(temp.path().join("notes.txt"), "B=2\n").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("c.env"), "C=3\n").unwrap();

        let vars = VariableStore::new([temp.path()]).load().unwrap();
        assert_eq!(vars.get("A").map(String::as_str), Some("1"));
        assert!(!vars.contains_key("B"));
        assert!(!vars.contains_key("C"));
    }

    #[test]
    fn test_missing_source_is_not_found() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("missing.env");
        let err = VariableStore::new([&missing]).load().unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(p) if p == missing));
    }

    #[test]
    fn test_override_without_equals_is_rejected() {
        let mut vars = VariableSet::new();
        let err = apply_overrides(&mut vars, &["TAG"]).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidOverride(raw) if raw == "TAG"));
    }
}
