//! Describe command - Print validated resource descriptors.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use ecs_manifest::ResourceObject;

use super::{ManifestArgs, RunContext};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub manifests: ManifestArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,
}

pub fn execute(args: DescribeArgs, ctx: &RunContext) -> Result<()> {
    let resources = ctx
        .loader(&args.manifests)
        .load_resources(ctx.cluster.clone())
        .with_context(|| format!("Failed to load {}", args.manifests.file.display()))?;

    info!("Describing {} resources", resources.len());
    print!("{}", format_resources(&resources, args.output)?);
    Ok(())
}

fn format_resources(resources: &[ResourceObject], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(resources)?,
        OutputFormat::Json => serde_json::to_string_pretty(resources)? + "\n",
    })
}
