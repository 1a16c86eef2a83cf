//! # ecs_dispatch
//!
//! Resource kind dispatch for ecsctl.
//!
//! Every resource descriptor names a `kind`. This crate looks that kind up
//! in a closed registry of handler factories, builds the handler from the
//! descriptor's fields, and reads result values out of API responses through
//! the handler's response path.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ecs_dispatch::{HandlerRegistry, ResourceHandle};
//! use ecs_manifest::{ClusterContext, LoadOptions, ManifestLoader};
//!
//! let resources = ManifestLoader::new("manifests/", LoadOptions::new())
//!     .load_resources(Arc::new(ClusterContext::new("staging")))
//!     .unwrap();
//!
//! let registry = HandlerRegistry::builtin();
//! for handle in resources.into_iter().map(ResourceHandle::new) {
//!     let handler = handle.resolve_handler(registry).unwrap();
//!     println!("{} -> {}", handle.resource(), handler.response_path());
//! }
//! ```

pub mod dispatch;
pub mod error;
pub mod handler;
pub mod kinds;
pub mod registry;

pub use dispatch::ResourceHandle;
pub use error::{DispatchError, DispatchResult};
pub use handler::{Handler, HandlerArgs, HandlerFactory};
pub use kinds::{KindFactory, KindHandler, BUILTIN_KINDS};
pub use registry::HandlerRegistry;
