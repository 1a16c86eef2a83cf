//! Built-in resource kinds.

use ecs_manifest::{ManifestResult, PathQuery};

use crate::handler::{Handler, HandlerArgs, HandlerFactory};

/// Every built-in kind and the response path its result is read from.
pub const BUILTIN_KINDS: &[(&str, &str)] = &[
    ("Cluster", "cluster.clusterArn"),
    ("Service", "service.serviceArn"),
    ("TaskDefinition", "taskDefinition.taskDefinitionArn"),
    ("Secret", "Version"),
    ("ConfigMap", "Version"),
    ("Cron", "RuleArn"),
];

/// Factory for a built-in kind.
#[derive(Debug, Clone)]
pub struct KindFactory {
    kind: String,
    response_path: PathQuery,
}

impl KindFactory {
    pub fn new(kind: impl Into<String>, response_path: &str) -> ManifestResult<Self> {
        Ok(Self {
            kind: kind.into(),
            response_path: PathQuery::parse(response_path)?,
        })
    }
}

impl HandlerFactory for KindFactory {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn create(&self, args: HandlerArgs) -> Box<dyn Handler> {
        Box::new(KindHandler {
            kind: self.kind.clone(),
            response_path: self.response_path.clone(),
            args,
        })
    }
}

/// Handler instance for a built-in kind.
#[derive(Debug, Clone)]
pub struct KindHandler {
    kind: String,
    response_path: PathQuery,
    args: HandlerArgs,
}

impl Handler for KindHandler {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn args(&self) -> &HandlerArgs {
        &self.args
    }

    fn response_path(&self) -> &PathQuery {
        &self.response_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_response_paths_compile() {
        for (kind, path) in BUILTIN_KINDS {
            let factory = KindFactory::new(*kind, path).unwrap();
            assert_eq!(factory.kind(), *kind);
        }
    }

    #[test]
    fn test_invalid_response_path() {
        assert!(KindFactory::new("Broken", "a..b").is_err());
    }
}
