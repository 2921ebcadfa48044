mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::document::{self, GenerateArgs, UpdateArgs};
use crate::config::ConfigOverrides;
use crate::error::{AppError, AppResult};

#[derive(Parser)]
#[command(
    name = "scribe",
    author,
    version,
    about = "Write and revise articles about GitHub pull requests"
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read credentials from this file instead of ./.env.
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Timeout for each remote request, in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an article from a pull request.
    Generate(GenerateArgs),
    /// Revise an existing article with fresh pull request data.
    Update(UpdateArgs),
    /// Inspect CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    load_env_file(cli.env_file.as_deref())?;
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Config(args) => config_cmd::run(
            args.command,
            &ConfigOverrides {
                model: None,
                timeout_secs: cli.timeout,
            },
        ),
        Commands::Generate(args) => {
            let overrides = args.source.overrides(cli.timeout);
            let ctx = cmd::prepare_context(|key| env::var(key).ok(), &overrides, cmd::connect)?;
            let outcome = document::generate(&ctx, args).await?;
            if outcome.research_results > 0 {
                println!(
                    "Article saved to {} ({} related resources)",
                    outcome.path.display(),
                    outcome.research_results
                );
            } else {
                println!("Article saved to {}", outcome.path.display());
            }
            Ok(())
        }
        Commands::Update(args) => {
            let overrides = args.source.overrides(cli.timeout);
            let ctx = cmd::prepare_context(|key| env::var(key).ok(), &overrides, cmd::connect)?;
            let outcome = document::update(&ctx, args).await?;
            println!("Updated article saved to {}", outcome.path.display());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "scribe=debug" } else { "scribe=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn load_env_file(path: Option<&std::path::Path>) -> AppResult<()> {
    match path {
        Some(path) => dotenvy::from_path(path).map_err(|err| {
            AppError::Configuration(format!("failed to load {}: {err}", path.display()))
        }),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(err) if err.not_found() => Ok(()),
            Err(err) => Err(AppError::Configuration(format!("failed to load .env: {err}"))),
        },
    }
}
