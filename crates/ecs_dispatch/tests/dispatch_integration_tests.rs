//! Integration tests for manifest-to-handler dispatch.

use std::sync::Arc;

use ecs_dispatch::{DispatchError, HandlerRegistry, ResourceHandle};
use ecs_manifest::{build_resources, ClusterContext, ErrorPolicy};
use serde_json::json;

const MANIFESTS: &str = r#"
apiVersion: v1
kind: TaskDefinition
metadata:
  name: web
spec:
  containerDefinitions:
    - name: web
      image: nginx
---
apiVersion: v1
kind: Service
metadata:
  name: web
  tags: [frontend, public]
  description: public web service
spec:
  taskDefinition: web
  desiredCount: 2
---
apiVersion: v1
kind: Bogus
metadata:
  name: nope
spec: {}
"#;

fn handles() -> Vec<ResourceHandle> {
    build_resources(
        MANIFESTS,
        Arc::new(ClusterContext::new("production")),
        ErrorPolicy::FailFast,
    )
    .unwrap()
    .into_iter()
    .map(ResourceHandle::from)
    .collect()
}

#[test]
fn test_known_kinds_resolve_in_order() {
    let registry = HandlerRegistry::builtin();
    let handles = handles();

    let kinds: Vec<_> = handles[..2]
        .iter()
        .map(|h| h.resolve_handler(registry).unwrap().kind().to_string())
        .collect();
    assert_eq!(kinds, vec!["TaskDefinition", "Service"]);
}

#[test]
fn test_bogus_kind_is_rejected() {
    let handles = handles();
    let err = handles[2]
        .resolve_handler(HandlerRegistry::builtin())
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnknownKind(kind) if kind == "Bogus"));
}

#[test]
fn test_service_handler_args_and_response() {
    let registry = HandlerRegistry::builtin();
    let handles = handles();
    let service = &handles[1];

    let handler = service.resolve_handler(registry).unwrap();
    let args = handler.args();
    assert_eq!(args.name, "web");
    assert_eq!(args.tags, vec!["frontend", "public"]);
    assert_eq!(args.yaml["desiredCount"].as_u64(), Some(2));
    assert_eq!(args.cluster.name, "production");
    assert_eq!(
        args.metadata.get("description").and_then(|v| v.as_str()),
        Some("public web service")
    );

    let response = json!({
        "service": {
            "serviceName": "web",
            "serviceArn": "arn:aws:ecs:eu-west-1:123:service/production/web"
        }
    });
    let arn = service.extract_response_field(registry, &response).unwrap();
    assert_eq!(arn, json!("arn:aws:ecs:eu-west-1:123:service/production/web"));
}
