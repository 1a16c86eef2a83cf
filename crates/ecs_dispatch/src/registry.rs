//! Handler registry mapping resource kinds to factories.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use ecs_manifest::ResourceObject;

use crate::error::{DispatchError, DispatchResult};
use crate::handler::{Handler, HandlerArgs, HandlerFactory};
use crate::kinds::{KindFactory, BUILTIN_KINDS};

static BUILTIN: LazyLock<HandlerRegistry> = LazyLock::new(|| {
    let mut registry = HandlerRegistry::new();
    for (kind, response_path) in BUILTIN_KINDS {
        let factory =
            KindFactory::new(*kind, response_path).expect("built-in response path is valid");
        registry.register(Arc::new(factory));
    }
    registry
});

/// A registry of handler factories.
///
/// Kinds are matched exactly: no case folding, no prefix matching.
#[derive(Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, Arc<dyn HandlerFactory>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The registry of built-in kinds, built once per process.
    pub fn builtin() -> &'static HandlerRegistry {
        &BUILTIN
    }

    /// Register a factory under its `kind()`.
    ///
    /// A factory already registered for the same kind is replaced.
    pub fn register(&mut self, factory: Arc<dyn HandlerFactory>) {
        let kind = factory.kind().to_string();
        debug!("Registering handler for kind: {}", kind);
        self.factories.insert(kind, factory);
    }

    /// Get the factory for a kind.
    pub fn get(&self, kind: &str) -> Option<Arc<dyn HandlerFactory>> {
        self.factories.get(kind).cloned()
    }

    /// Get the factory for a kind, returning an error if it is unknown.
    pub fn get_required(&self, kind: &str) -> DispatchResult<Arc<dyn HandlerFactory>> {
        self.get(kind)
            .ok_or_else(|| DispatchError::UnknownKind(kind.to_string()))
    }

    /// Check if a kind is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.factories.keys().map(|s| s.as_str()).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build a fresh handler for `resource`.
    pub fn create(&self, resource: &ResourceObject) -> DispatchResult<Box<dyn Handler>> {
        let factory = self.get_required(resource.kind())?;
        debug!("Creating handler for {}", resource.identity());
        Ok(factory.create(HandlerArgs::from_resource(resource)))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        let registry = HandlerRegistry::builtin();
        assert_eq!(registry.len(), BUILTIN_KINDS.len());
        assert!(registry.contains("Service"));
        assert!(registry.contains("TaskDefinition"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = HandlerRegistry::builtin();
        assert!(registry.get("service").is_none());
        assert!(registry.get("Service ").is_none());
        assert!(matches!(
            registry.get_required("Bogus"),
            Err(DispatchError::UnknownKind(kind)) if kind == "Bogus"
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(KindFactory::new("Service", "a").unwrap()));
        registry.register(Arc::new(KindFactory::new("Service", "b").unwrap()));
        registry.register(Arc::new(KindFactory::new("Cron", "c").unwrap()));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.kinds(), vec!["Cron", "Service"]);
    }
}
