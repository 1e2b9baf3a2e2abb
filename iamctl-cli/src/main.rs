//! iamctl - IAM policy tooling
//!
//! `iamctl genpolicy` compiles an IAM policy JSON document into a Rust module
//! whose `get_iam_policy()` returns the policy as a credential-request
//! `StatementEntry` list, one resource per statement.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use iamctl_policy_generation::{
    generate_iam_policy, normalize_policy_file, CodegenConfig, GeneratePolicyConfig, SchemaNames,
    DEFAULT_PACKAGE,
};

/// iamctl - IAM policy tooling
#[derive(Parser, Debug)]
#[command(name = "iamctl")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate Rust source embedding the IAM policy from a policy JSON file
    #[command(name = "genpolicy")]
    GenPolicy {
        /// Input policy JSON file
        #[arg(short, long)]
        input_file: PathBuf,

        /// Output Rust file, replaced on success
        #[arg(short, long)]
        output_file: PathBuf,

        /// Module name the generated code is placed in
        #[arg(short, long, default_value = DEFAULT_PACKAGE)]
        package: String,

        /// Skeleton source to use instead of the bundled one
        #[arg(long)]
        template: Option<PathBuf>,

        /// TOML file overriding the target type and field names
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Print the policy JSON with every statement reduced to a single resource
    Normalize {
        /// Input policy JSON file
        #[arg(short, long)]
        input_file: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_target(false)
        .init();
}

fn codegen_config(template: Option<PathBuf>, schema: Option<PathBuf>) -> Result<CodegenConfig> {
    let mut config = CodegenConfig::default();
    if let Some(path) = template {
        config = config
            .with_template_file(&path)
            .with_context(|| format!("Failed to load template {}", path.display()))?;
    }
    if let Some(path) = schema {
        let names = SchemaNames::from_toml_file(&path)
            .with_context(|| format!("Failed to load schema names from {}", path.display()))?;
        config = config.with_schema(names);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("{:?}", cli.command);

    match cli.command {
        Commands::GenPolicy {
            input_file,
            output_file,
            package,
            template,
            schema,
        } => {
            let codegen = codegen_config(template, schema)?;
            let config = GeneratePolicyConfig::new(&input_file, &output_file)
                .with_package(package)
                .with_codegen(codegen);

            let summary = generate_iam_policy(&config).with_context(|| {
                format!(
                    "Failed to generate IAM policy from {}",
                    input_file.display()
                )
            })?;
            info!("Generated {} bytes of Rust source", summary.bytes_written);
        }
        Commands::Normalize { input_file, pretty } => {
            let document = normalize_policy_file(&input_file).with_context(|| {
                format!("Failed to normalize policy {}", input_file.display())
            })?;
            let json = if pretty {
                serde_json::to_string_pretty(&document)
            } else {
                serde_json::to_string(&document)
            }
            .context("Failed to serialize normalized policy")?;
            println!("{}", json);
        }
    }

    Ok(())
}
