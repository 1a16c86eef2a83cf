//! Extract command - Read result values out of an API response.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, warn};

use ecs_dispatch::{HandlerRegistry, ResourceHandle};

use super::{ManifestArgs, RunContext};

#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub manifests: ManifestArgs,

    /// API response document (.json, otherwise read as YAML)
    #[arg(long)]
    pub response: PathBuf,

    /// Only resources of this kind
    #[arg(long)]
    pub kind: Option<String>,

    /// Only resources with this name
    #[arg(long)]
    pub name: Option<String>,
}

/// A parsed response document.
#[derive(Debug)]
enum Response {
    Json(serde_json::Value),
    Yaml(serde_yaml::Value),
}

impl Response {
    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read response {}", path.display()))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Ok(Self::Json(serde_json::from_str(&text)?))
        } else {
            Ok(Self::Yaml(serde_yaml::from_str(&text)?))
        }
    }

    fn extract(&self, handle: &ResourceHandle, registry: &HandlerRegistry) -> Result<String> {
        match self {
            Self::Json(value) => scalar(handle.extract_response_field(registry, value)?),
            Self::Yaml(value) => scalar(handle.extract_response_field(registry, value)?),
        }
    }
}

/// Print strings bare and anything else as compact JSON.
fn scalar<N: serde::Serialize>(value: N) -> Result<String> {
    let json = serde_json::to_value(&value)?;
    Ok(match json {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

pub fn execute(args: ExtractArgs, ctx: &RunContext) -> Result<()> {
    let response = Response::read(&args.response)?;
    debug!("Loaded response document {:?}", args.response);

    let resources = ctx
        .loader(&args.manifests)
        .load_resources(ctx.cluster.clone())
        .with_context(|| format!("Failed to load {}", args.manifests.file.display()))?;

    let registry = HandlerRegistry::builtin();
    let keep_going = ctx.keep_going(&args.manifests);
    let mut extracted = 0usize;

    let selected = resources.into_iter().filter(|r| {
        args.kind.as_deref().map_or(true, |k| r.kind() == k)
            && args.name.as_deref().map_or(true, |n| r.name() == n)
    });

    for handle in selected.map(ResourceHandle::new) {
        match response.extract(&handle, registry) {
            Ok(value) => {
                extracted += 1;
                println!("{}\t{}", handle.resource(), value);
            }
            Err(e) if keep_going => warn!("{}: {:#}", handle.resource(), e),
            Err(e) => return Err(e.context(format!("No result for {}", handle.resource()))),
        }
    }

    if extracted == 0 {
        anyhow::bail!("No value extracted from {}", args.response.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ecs_manifest::{build_resources, ClusterContext, ErrorPolicy};
    use tempfile::tempdir;

    fn cluster_handle() -> ResourceHandle {
        let resources = build_resources(
            "apiVersion: v1\nkind: Cluster\nmetadata:\n  name: main\nspec: {}\n",
            Arc::new(ClusterContext::default()),
            ErrorPolicy::FailFast,
        )
        .unwrap();
        ResourceHandle::new(resources.into_iter().next().unwrap())
    }

    #[test]
    fn test_json_and_yaml_responses() {
        let temp = tempdir().unwrap();
        let json_path = temp.path().join("response.json");
        let yaml_path = temp.path().join("response.yaml");
        fs::write(&json_path, r#"{"cluster": {"clusterArn": "arn:json"}}"#).unwrap();
        fs::write(&yaml_path, "cluster:\n  clusterArn: arn:yaml\n").unwrap();

        let handle = cluster_handle();
        let registry = HandlerRegistry::builtin();

        let json = Response::read(&json_path).unwrap();
        assert!(matches!(json, Response::Json(_)));
        assert_eq!(json.extract(&handle, registry).unwrap(), "arn:json");

        let yaml = Response::read(&yaml_path).unwrap();
        assert!(matches!(yaml, Response::Yaml(_)));
        assert_eq!(yaml.extract(&handle, registry).unwrap(), "arn:yaml");
    }

    #[test]
    fn test_missing_field_fails() {
        let response = Response::Yaml(serde_yaml::from_str("other: 1").unwrap());
        let handle = cluster_handle();
        assert!(response.extract(&handle, HandlerRegistry::builtin()).is_err());
    }
}
