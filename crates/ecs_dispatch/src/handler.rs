//! The handler contract.
//!
//! A handler turns one resource descriptor into calls against the
//! infrastructure API. Handlers are created by a [`HandlerFactory`]
//! registered under the resource kind, and are given the descriptor's
//! fields as [`HandlerArgs`].

use std::fmt;
use std::sync::Arc;

use serde_yaml::{Mapping, Value};

use ecs_manifest::{ClusterContext, PathQuery, ResourceObject};

/// Arguments a handler is constructed from.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerArgs {
    pub name: String,
    pub tags: Vec<String>,
    /// The resource's `spec` block.
    pub yaml: Value,
    pub cluster: Arc<ClusterContext>,
    /// The resource's metadata without `name`.
    pub metadata: Mapping,
}

impl HandlerArgs {
    /// Copy the handler arguments out of a descriptor.
    pub fn from_resource(resource: &ResourceObject) -> Self {
        Self {
            name: resource.name().to_string(),
            tags: resource.tags().to_vec(),
            yaml: resource.spec().clone(),
            cluster: Arc::clone(resource.cluster()),
            metadata: resource.metadata().clone(),
        }
    }
}

/// A kind-specific resource handler.
pub trait Handler: fmt::Debug + Send + Sync {
    /// Resource kind this handler serves.
    fn kind(&self) -> &str;

    /// Arguments the handler was built from.
    fn args(&self) -> &HandlerArgs;

    /// Where the result value sits in an API response document.
    fn response_path(&self) -> &PathQuery;
}

/// Builds handlers for one resource kind.
pub trait HandlerFactory: Send + Sync {
    /// The kind this factory is registered under.
    fn kind(&self) -> &str;

    fn create(&self, args: HandlerArgs) -> Box<dyn Handler>;
}
