//! Target cluster shared by every resource in a run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The cluster resources are applied to.
///
/// Built once per run and shared read-only by every descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterContext {
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl ClusterContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl Default for ClusterContext {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Display for ClusterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{} ({})", self.name, region),
            None => write!(f, "{}", self.name),
        }
    }
}
