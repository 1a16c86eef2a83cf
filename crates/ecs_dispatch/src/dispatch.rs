//! Binding descriptors to their handlers.

use std::cell::OnceCell;
use std::fmt;

use tracing::info;

use ecs_manifest::{QueryNode, ResourceObject, SchemaError};

use crate::error::DispatchResult;
use crate::handler::Handler;
use crate::registry::HandlerRegistry;

/// A descriptor together with its lazily resolved handler.
///
/// The handler is constructed on first use and reused afterwards.
pub struct ResourceHandle {
    resource: ResourceObject,
    handler: OnceCell<Box<dyn Handler>>,
}

impl ResourceHandle {
    pub fn new(resource: ResourceObject) -> Self {
        Self {
            resource,
            handler: OnceCell::new(),
        }
    }

    pub fn resource(&self) -> &ResourceObject {
        &self.resource
    }

    pub fn into_resource(self) -> ResourceObject {
        self.resource
    }

    /// Whether a handler has been constructed yet.
    pub fn is_resolved(&self) -> bool {
        self.handler.get().is_some()
    }

    /// The handler for this resource's kind, constructing it on first call.
    pub fn resolve_handler(&self, registry: &HandlerRegistry) -> DispatchResult<&dyn Handler> {
        if let Some(handler) = self.handler.get() {
            return Ok(&**handler);
        }

        let handler = registry.create(&self.resource)?;
        info!("Resolved handler for {}", self.resource.identity());
        Ok(&**self.handler.get_or_init(|| handler))
    }

    /// Read the handler's response path from `response`.
    ///
    /// Resolves the handler first if needed. Fails when nothing matches.
    pub fn extract_response_field<N>(
        &self,
        registry: &HandlerRegistry,
        response: &N,
    ) -> DispatchResult<N>
    where
        N: QueryNode + Clone,
    {
        let path = self.resolve_handler(registry)?.response_path();
        path.first(response).cloned().ok_or_else(|| {
            SchemaError::NoMatch {
                path: path.expression().to_string(),
            }
            .into()
        })
    }
}

impl From<ResourceObject> for ResourceHandle {
    fn from(resource: ResourceObject) -> Self {
        Self::new(resource)
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("resource", &self.resource.identity())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use ecs_manifest::{ClusterContext, PathQuery};
    use serde_json::json;

    use crate::error::DispatchError;
    use crate::handler::{HandlerArgs, HandlerFactory};
    use crate::kinds::KindFactory;

    fn resource(kind: &str) -> ResourceObject {
        let document: serde_yaml::Value = serde_yaml::from_str(&format!(
            "apiVersion: v1\nkind: {}\nmetadata: {{name: web, tags: [blue]}}\nspec: {{image: nginx}}\n",
            kind
        ))
        .unwrap();
        ResourceObject::from_document(Arc::new(ClusterContext::new("test")), &document).unwrap()
    }

    struct CountingFactory {
        inner: KindFactory,
        created: Arc<AtomicUsize>,
    }

    impl HandlerFactory for CountingFactory {
        fn kind(&self) -> &str {
            self.inner.kind()
        }

        fn create(&self, args: HandlerArgs) -> Box<dyn Handler> {
            self.created.fetch_add(1, Ordering::SeqCst);
            self.inner.create(args)
        }
    }

    #[test]
    fn test_handler_receives_descriptor_fields() {
        let handle = ResourceHandle::new(resource("Service"));
        let handler = handle.resolve_handler(HandlerRegistry::builtin()).unwrap();

        assert_eq!(handler.kind(), "Service");
        let args = handler.args();
        assert_eq!(args.name, "web");
        assert_eq!(args.tags, vec!["blue"]);
        assert_eq!(args.yaml["image"].as_str(), Some("nginx"));
        assert_eq!(args.cluster.name, "test");
        assert!(!args.metadata.contains_key("name"));
    }

    #[test]
    fn test_handler_is_constructed_once() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(CountingFactory {
            inner: KindFactory::new("Service", "service.serviceArn").unwrap(),
            created: Arc::clone(&created),
        }));

        let handle = ResourceHandle::new(resource("Service"));
        assert!(!handle.is_resolved());
        handle.resolve_handler(&registry).unwrap();
        handle.resolve_handler(&registry).unwrap();
        handle
            .extract_response_field(&registry, &json!({"service": {"serviceArn": "arn"}}))
            .unwrap();

        assert!(handle.is_resolved());
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_kind() {
        let handle = ResourceHandle::new(resource("Bogus"));
        let err = handle.resolve_handler(HandlerRegistry::builtin()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownKind(kind) if kind == "Bogus"));
        assert!(!handle.is_resolved());
    }

    #[test]
    fn test_extract_response_field_resolves_lazily() {
        let handle = ResourceHandle::new(resource("TaskDefinition"));
        let response = json!({
            "taskDefinition": {"taskDefinitionArn": "arn:aws:ecs:eu-west-1:1:task-definition/web:3"}
        });

        let value = handle
            .extract_response_field(HandlerRegistry::builtin(), &response)
            .unwrap();
        assert_eq!(value, json!("arn:aws:ecs:eu-west-1:1:task-definition/web:3"));
    }

    #[test]
    fn test_extract_response_field_no_match() {
        let handle = ResourceHandle::new(resource("Service"));
        let err = handle
            .extract_response_field(HandlerRegistry::builtin(), &json!({"service": {}}))
            .unwrap_err();
        match err {
            DispatchError::Schema(SchemaError::NoMatch { path }) => {
                assert_eq!(path, "service.serviceArn")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_extract_from_yaml_response() {
        let handle = ResourceHandle::new(resource("Cron"));
        let response: serde_yaml::Value = serde_yaml::from_str("RuleArn: arn:rule").unwrap();
        let value = handle
            .extract_response_field(HandlerRegistry::builtin(), &response)
            .unwrap();
        assert_eq!(value.as_str(), Some("arn:rule"));
        assert_eq!(
            handle
                .resolve_handler(HandlerRegistry::builtin())
                .unwrap()
                .response_path(),
            &PathQuery::parse("RuleArn").unwrap()
        );
    }
}
