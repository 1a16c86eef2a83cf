//! CLI command definitions.
//!
//! Every subcommand loads manifests the same way, so the shared manifest
//! flags live in [`ManifestArgs`] and are merged with the config file here.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use ecs_manifest::{ClusterContext, ErrorPolicy, LoadOptions, ManifestLoader, RenderOptions};

use crate::config::CliConfig;

pub mod describe;
pub mod extract;
pub mod render;
pub mod validate;

/// ecsctl - declarative manifests for container services
#[derive(Parser)]
#[command(name = "ecsctl")]
#[command(version, about = "ecsctl - declarative manifests for container services")]
#[command(long_about = r#"
ecsctl reads YAML manifests (optionally Jinja templates fed by .env files),
validates them and hands every resource to the handler for its kind.

COMMANDS:
  validate  → Load manifests and resolve a handler for every resource
  render    → Print the manifest text after templating
  describe  → Print the validated resource descriptors
  extract   → Read each resource's result value from an API response

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or missing path
  3 - Validation failure
  4 - Template error
  5 - Unknown resource kind
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to ./.ecsctl.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Target cluster name
    #[arg(long, global = true, env = "ECSCTL_CLUSTER")]
    pub cluster: Option<String>,

    /// Target region
    #[arg(long, global = true, env = "ECSCTL_REGION")]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate manifests and resolve their handlers
    Validate(validate::ValidateArgs),

    /// Print rendered manifest text
    Render(render::RenderArgs),

    /// Print validated resource descriptors
    Describe(describe::DescribeArgs),

    /// Extract result values from an API response document
    Extract(extract::ExtractArgs),
}

/// Flags selecting and preparing manifests.
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Manifest file or directory
    #[arg(short, long = "file")]
    pub file: PathBuf,

    /// Treat manifests as templates (.tpl) and render them first
    #[arg(short, long)]
    pub template: bool,

    /// Variable file or directory of .env files (repeatable)
    #[arg(long = "env-file")]
    pub env_files: Vec<PathBuf>,

    /// Inline variable override KEY=VALUE (repeatable)
    #[arg(short = 'e', long = "var")]
    pub vars: Vec<String>,

    /// Extra include directory for templates (repeatable)
    #[arg(long = "search-path")]
    pub search_paths: Vec<PathBuf>,

    /// Scan manifest directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Report every invalid document instead of stopping at the first
    #[arg(short, long)]
    pub keep_going: bool,
}

/// Settings shared by every command for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: CliConfig,
    pub cluster: Arc<ClusterContext>,
    pub quiet: bool,
}

impl RunContext {
    /// Merge command-line flags over the config file.
    pub fn new(cli: &Cli, config: CliConfig) -> Self {
        let name = cli
            .cluster
            .clone()
            .or_else(|| config.cluster.clone())
            .unwrap_or_else(|| ClusterContext::default().name);
        let mut cluster = ClusterContext::new(name);
        if let Some(region) = cli.region.clone().or_else(|| config.region.clone()) {
            cluster = cluster.with_region(region);
        }

        Self {
            config,
            cluster: Arc::new(cluster),
            quiet: cli.quiet,
        }
    }

    /// Whether schema errors should be collected rather than fail fast.
    pub fn keep_going(&self, args: &ManifestArgs) -> bool {
        args.keep_going || self.config.keep_going
    }

    /// Build the manifest loader for `args`.
    pub fn loader(&self, args: &ManifestArgs) -> ManifestLoader {
        let policy = if self.keep_going(args) {
            ErrorPolicy::CollectAll
        } else {
            ErrorPolicy::FailFast
        };

        let mut options = LoadOptions::new()
            .recursive(args.recursive || self.config.recursive)
            .error_policy(policy);

        if args.template {
            let render = RenderOptions {
                variable_sources: self
                    .config
                    .env_files
                    .iter()
                    .chain(&args.env_files)
                    .cloned()
                    .collect(),
                overrides: args.vars.clone(),
                search_paths: args
                    .search_paths
                    .iter()
                    .chain(&self.config.template_search_paths)
                    .cloned()
                    .collect(),
            };
            options = options.templated(render);
        }

        ManifestLoader::new(&args.file, options)
    }
}
