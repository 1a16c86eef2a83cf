//! ecsctl CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or missing path
//! - 3: Validation failure
//! - 4: Template error
//! - 5: Unknown resource kind

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ecs_dispatch::DispatchError;
use ecs_manifest::ManifestError;

mod commands;
mod config;

use commands::{Cli, Commands, RunContext};
use config::{CliConfig, ConfigError};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const UNKNOWN_KIND: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    let mut filter = EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into());
    for target in ["ecsctl", "ecs_cli", "ecs_manifest", "ecs_dispatch"] {
        if let Ok(directive) = format!("{}={}", target, level).parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    // Ignore a second initialization.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let ctx = RunContext::new(&cli, config);
    debug!("Target cluster: {}", ctx.cluster);

    match cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &ctx),
        Commands::Render(args) => commands::render::execute(args, &ctx),
        Commands::Describe(args) => commands::describe::execute(args, &ctx),
        Commands::Extract(args) => commands::extract::execute(args, &ctx),
    }
}

/// Map the first typed error in the chain to an exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<ManifestError>() {
            return manifest_exit_code(err);
        }
        if let Some(err) = cause.downcast_ref::<DispatchError>() {
            return match err {
                DispatchError::UnknownKind(_) => ExitCodes::UNKNOWN_KIND,
                DispatchError::Schema(_) => ExitCodes::VALIDATION_FAILURE,
                DispatchError::Manifest(inner) => manifest_exit_code(inner),
            };
        }
        if let Some(err) = cause.downcast_ref::<ConfigError>() {
            return match err {
                ConfigError::NotFound(_) | ConfigError::Toml(_) => ExitCodes::INVALID_ARGS,
                ConfigError::Io(_) => ExitCodes::GENERAL_ERROR,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn manifest_exit_code(err: &ManifestError) -> u8 {
    match err {
        ManifestError::NotFound(_) | ManifestError::InvalidOverride(_) | ManifestError::Glob(_) => {
            ExitCodes::INVALID_ARGS
        }
        ManifestError::TemplateNotFound(_) | ManifestError::Rendering(_) => {
            ExitCodes::TEMPLATE_ERROR
        }
        ManifestError::Parse { .. }
        | ManifestError::Schema { .. }
        | ManifestError::InvalidQuery { .. }
        | ManifestError::Multiple(_) => ExitCodes::VALIDATION_FAILURE,
        ManifestError::Io(_) => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecs_manifest::SchemaError;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes_follow_error_type() {
        let missing = anyhow::Error::new(ManifestError::NotFound(PathBuf::from("x")));
        assert_eq!(categorize_error(&missing), ExitCodes::INVALID_ARGS);

        let template = anyhow::Error::new(ManifestError::TemplateNotFound("a.j2".into()))
            .context("Failed to render");
        assert_eq!(categorize_error(&template), ExitCodes::TEMPLATE_ERROR);

        let schema = anyhow::Error::new(ManifestError::Schema {
            document: 0,
            source: SchemaError::missing("kind"),
        });
        assert_eq!(categorize_error(&schema), ExitCodes::VALIDATION_FAILURE);

        let unknown = anyhow::Error::new(DispatchError::UnknownKind("Bogus".into()))
            .context("Cannot handle Bogus: x");
        assert_eq!(categorize_error(&unknown), ExitCodes::UNKNOWN_KIND);

        assert_eq!(
            categorize_error(&anyhow::anyhow!("boom")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
