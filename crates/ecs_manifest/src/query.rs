//! Dot-path queries over parsed YAML and JSON trees.
//!
//! An expression is a `.`-separated list of segments. Each segment is a field
//! name, optionally followed by one index selector: `[N]` picks one sequence
//! item and `[*]` every item. A bare `*` segment selects every child of a
//! mapping or sequence.
//!
//! ```
//! use ecs_manifest::PathQuery;
//!
//! let doc: serde_yaml::Value =
//!     serde_yaml::from_str("metadata: {name: web, tags: [a, b]}").unwrap();
//! let query = PathQuery::parse("metadata.tags[1]").unwrap();
//! assert_eq!(query.first(&doc).and_then(|v| v.as_str()), Some("b"));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ManifestError, ManifestResult};

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<field>[A-Za-z_$][A-Za-z0-9_$\-]*|\*)(?:\[(?P<index>\d+|\*)\])?$")
        .expect("segment pattern is valid")
});

/// A tree that path queries can walk.
pub trait QueryNode {
    /// Value stored under `key` when this node is a mapping.
    fn field(&self, key: &str) -> Option<&Self>;

    /// Item at `index` when this node is a sequence.
    fn item(&self, index: usize) -> Option<&Self>;

    /// Every direct child of a mapping or sequence.
    fn children(&self) -> Vec<&Self>;

    /// Items when this node is a sequence.
    fn items(&self) -> Option<Vec<&Self>>;
}

impl QueryNode for serde_yaml::Value {
    fn field(&self, key: &str) -> Option<&Self> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    fn item(&self, index: usize) -> Option<&Self> {
        self.as_sequence().and_then(|s| s.get(index))
    }

    fn children(&self) -> Vec<&Self> {
        match self {
            serde_yaml::Value::Mapping(m) => m.values().collect(),
            serde_yaml::Value::Sequence(s) => s.iter().collect(),
            serde_yaml::Value::Tagged(t) => t.value.children(),
            _ => Vec::new(),
        }
    }

    fn items(&self) -> Option<Vec<&Self>> {
        self.as_sequence().map(|s| s.iter().collect())
    }
}

impl QueryNode for serde_json::Value {
    fn field(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|m| m.get(key))
    }

    fn item(&self, index: usize) -> Option<&Self> {
        self.as_array().and_then(|a| a.get(index))
    }

    fn children(&self) -> Vec<&Self> {
        match self {
            serde_json::Value::Object(m) => m.values().collect(),
            serde_json::Value::Array(a) => a.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn items(&self) -> Option<Vec<&Self>> {
        self.as_array().map(|a| a.iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Field(String),
    AnyChild,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Index {
    At(usize),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    selector: Selector,
    index: Option<Index>,
}

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    expression: String,
    segments: Vec<Segment>,
}

impl PathQuery {
    /// Compile an expression such as `metadata.tags` or `services[0].serviceArn`.
    pub fn parse(expression: &str) -> ManifestResult<Self> {
        let invalid = |message: String| ManifestError::InvalidQuery {
            expression: expression.to_string(),
            message,
        };

        if expression.trim().is_empty() {
            return Err(invalid("expression is empty".to_string()));
        }

        let mut segments = Vec::new();
        for raw in expression.split('.') {
            let caps = SEGMENT
                .captures(raw)
                .ok_or_else(|| invalid(format!("invalid segment `{}`", raw)))?;

            let selector = match &caps["field"] {
                "*" => Selector::AnyChild,
                name => Selector::Field(name.to_string()),
            };
            let index = match caps.name("index").map(|m| m.as_str()) {
                None => None,
                Some("*") => Some(Index::All),
                Some(n) => Some(Index::At(
                    n.parse()
                        .map_err(|_| invalid(format!("index `{}` is out of range", n)))?,
                )),
            };
            segments.push(Segment { selector, index });
        }

        Ok(Self {
            expression: expression.to_string(),
            segments,
        })
    }

    /// The source expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Every node the expression selects, in document order.
    pub fn find<'a, N: QueryNode>(&self, root: &'a N) -> Vec<&'a N> {
        let mut current = vec![root];

        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                let selected: Vec<&N> = match &segment.selector {
                    Selector::Field(name) => node.field(name).into_iter().collect(),
                    Selector::AnyChild => node.children(),
                };
                for value in selected {
                    match &segment.index {
                        None => next.push(value),
                        Some(Index::At(i)) => next.extend(value.item(*i)),
                        Some(Index::All) => next.extend(value.items().unwrap_or_default()),
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }

        current
    }

    /// The first selected node, if any.
    pub fn first<'a, N: QueryNode>(&self, root: &'a N) -> Option<&'a N> {
        self.find(root).into_iter().next()
    }
}

impl FromStr for PathQuery {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}
