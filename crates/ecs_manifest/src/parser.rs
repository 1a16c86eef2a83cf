//! Multi-document YAML parsing.

use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::{ManifestError, ManifestResult};

/// One parsed document and its position in the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Zero-based position among all documents in the stream.
    pub index: usize,
    pub value: Value,
}

/// Lazily parses a YAML stream one document at a time.
///
/// Mapping key order is preserved. Empty documents are skipped. The first
/// syntax error ends the stream.
pub struct ManifestParser<'a> {
    inner: serde_yaml::Deserializer<'a>,
    index: usize,
    failed: bool,
}

impl<'a> ManifestParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: serde_yaml::Deserializer::from_str(text),
            index: 0,
            failed: false,
        }
    }

    /// Parse every document eagerly.
    pub fn parse_all(text: &'a str) -> ManifestResult<Vec<Document>> {
        Self::new(text).collect()
    }
}

impl Iterator for ManifestParser<'_> {
    type Item = ManifestResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let de = self.inner.next()?;
            let index = self.index;
            self.index += 1;

            match Value::deserialize(de).and_then(|mut value| {
                value.apply_merge()?;
                Ok(value)
            }) {
                Ok(Value::Null) => {
                    warn!("Skipping empty document {}", index);
                }
                Ok(value) => {
                    debug!("Parsed document {}", index);
                    return Some(Ok(Document { index, value }));
                }
                Err(e) => {
                    self.failed = true;
                    let location = e.location();
                    return Some(Err(ManifestError::Parse {
                        document: index,
                        line: location.as_ref().map(|l| l.line()),
                        column: location.as_ref().map(|l| l.column()),
                        message: e.to_string(),
                    }));
                }
            }
        }
    }
}
