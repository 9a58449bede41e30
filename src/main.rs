//! CLI entry point for hub metadata validation.

use std::path::PathBuf;

use clap::Parser;

use hub_validations::metadata::{ExtensionRules, MetadataValidator, ValidationConfig};
use hub_validations::metadata::validate::REGISTRY_CHECK_HUB;
use hub_validations::registry::{ModelRegistry, ZoltarRegistry};

/// Validate forecast-hub metadata files.
#[derive(Parser, Debug)]
#[command(name = "hub-validations", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check metadata file contents against the schema and field rules.
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
struct ValidateArgs {
    /// Metadata files to check (`metadata-<model_abbr>.txt`).
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Declarative schema for metadata structure.
    #[arg(long, default_value = "static/schema.json")]
    schema: PathBuf,

    /// Accepted-licenses reference table.
    #[arg(long, default_value = "static/accepted-licenses.csv")]
    licenses: PathBuf,

    /// Hub repository this run is scoped to; the registry cross-check
    /// only activates for the covid19 forecast hub.
    #[arg(long)]
    hub_repository: Option<String>,

    /// Enable the required-field presence rule.
    #[arg(long)]
    require_fields: bool,

    /// Enable the methods length rule.
    #[arg(long)]
    check_methods_length: bool,

    /// Enable the team URL rule.
    #[arg(long)]
    check_team_url: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(args) => validate(args),
    }
}

fn validate(args: ValidateArgs) -> anyhow::Result<()> {
    let config = ValidationConfig::builder()
        .schema_path(args.schema)
        .license_path(args.licenses)
        .hub_repository(args.hub_repository.clone())
        .extensions(ExtensionRules {
            required_fields: args.require_fields,
            methods_length: args.check_methods_length,
            team_url: args.check_team_url,
        })
        .build()?;

    let registry = if args.hub_repository.as_deref() == Some(REGISTRY_CHECK_HUB) {
        Some(ZoltarRegistry::new()?)
    } else {
        None
    };
    let registry_ref = registry.as_ref().map(|r| r as &dyn ModelRegistry);

    let validator = MetadataValidator::new(config, registry_ref)?;
    let result = validator.validate_batch(&args.files);

    for comment in &result.comments {
        println!("{comment}");
    }
    for (file, messages) in &result.errors {
        println!("❌ {}:", file.display());
        for message in messages {
            println!("  {message}");
        }
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
