//! Validate command - Load manifests and resolve every handler.

use anyhow::{Context, Result};
use clap::Args;
use tracing::{error, info};

use ecs_dispatch::{HandlerRegistry, ResourceHandle};

use super::{ManifestArgs, RunContext};

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub manifests: ManifestArgs,
}

pub fn execute(args: ValidateArgs, ctx: &RunContext) -> Result<()> {
    info!("Validating manifests in {:?}", args.manifests.file);

    let resources = ctx
        .loader(&args.manifests)
        .load_resources(ctx.cluster.clone())
        .with_context(|| format!("Failed to load {}", args.manifests.file.display()))?;

    let registry = HandlerRegistry::builtin();
    let keep_going = ctx.keep_going(&args.manifests);
    let mut failures = Vec::new();

    for handle in resources.into_iter().map(ResourceHandle::new) {
        match handle.resolve_handler(registry) {
            Ok(handler) => {
                if !ctx.quiet {
                    println!("✅ {} ({})", handle.resource(), handler.response_path());
                }
            }
            Err(e) if keep_going => {
                error!("{}: {}", handle.resource(), e);
                println!("❌ {}: {}", handle.resource(), e);
                failures.push(e);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot handle {}", handle.resource()));
            }
        }
    }

    if let Some(first) = failures.into_iter().next() {
        return Err(first).context("One or more resources have no handler");
    }

    info!("All resources validated");
    Ok(())
}
