//! # ecs_manifest
//!
//! Manifest loading for ecsctl.
//!
//! This crate turns a file or directory of YAML manifests into validated
//! resource descriptors:
//!
//! - Reading and joining manifest files into one multi-document stream
//! - Optional Jinja rendering driven by `.env` variable files and overrides
//! - Lazy multi-document parsing with key order preserved
//! - Descriptor validation (`kind`, `metadata.name`, `spec`, `apiVersion: v1`)
//! - Dot-path queries over YAML and JSON trees
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ecs_manifest::{ClusterContext, LoadOptions, ManifestLoader, RenderOptions};
//!
//! let options = LoadOptions::new().templated(
//!     RenderOptions::new()
//!         .with_variable_source("envs/")
//!         .with_override("IMAGE_TAG=1.4.2"),
//! );
//! let loader = ManifestLoader::new("manifests/", options);
//! let resources = loader
//!     .load_resources(Arc::new(ClusterContext::new("staging")))
//!     .unwrap();
//!
//! for resource in &resources {
//!     println!("{}", resource.identity());
//! }
//! ```

pub mod cluster;
pub mod error;
pub mod loader;
pub mod parser;
pub mod query;
pub mod reader;
pub mod renderer;
pub mod resource;
pub mod vars;

pub use cluster::ClusterContext;
pub use error::{ManifestError, ManifestResult, SchemaError};
pub use loader::{build_resources, ErrorPolicy, LoadOptions, ManifestLoader};
pub use parser::{Document, ManifestParser};
pub use query::{PathQuery, QueryNode};
pub use reader::{ManifestMode, ManifestReader, ReaderOptions, DOCUMENT_SEPARATOR};
pub use renderer::{RenderOptions, TemplateRenderer};
pub use resource::{ResourceObject, SUPPORTED_API_VERSION};
pub use vars::{apply_overrides, VariableSet, VariableStore};
