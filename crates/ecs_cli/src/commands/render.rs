//! Render command - Print manifest text after templating.

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use super::{ManifestArgs, RunContext};

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub manifests: ManifestArgs,
}

pub fn execute(args: RenderArgs, ctx: &RunContext) -> Result<()> {
    let text = ctx
        .loader(&args.manifests)
        .load_text()
        .with_context(|| format!("Failed to render {}", args.manifests.file.display()))?;

    debug!("Rendered {} bytes", text.len());
    print!("{}", text);
    Ok(())
}
