//! cmake-query - CMake file-based API client
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use cmake_query::cli::commands::{self, Context};
use cmake_query::cli::{Cli, Commands};
use cmake_query::config::{Config, ConfigManager};
use cmake_query::error::QueryResult;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> QueryResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Config path: {}", config_manager.path().display());

    apply_overrides(&cli, &mut config);
    let ctx = Context {
        config,
        build_dir: cli.build_dir.clone(),
    };

    match cli.command {
        Commands::Cache(args) => commands::cache(args, &ctx).await,
        Commands::MinimumRequired(args) => commands::minimum_required(args, &ctx).await,
        Commands::Targets(args) => commands::targets(args, &ctx).await,
        Commands::Codemodel(args) => commands::codemodel(args, &ctx).await,
        Commands::Object(args) => commands::object(args, &ctx).await,
        Commands::Status(args) => commands::status(args, &ctx).await,
    }
}

/// Logs go to stderr; stdout carries only command output.
///
/// 0 = warn, 1 = info, 2+ = debug. `RUST_LOG` wins when set.
fn init_logging(verbose: u8, config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("cmake_query=warn"),
        1 => EnvFilter::new("cmake_query=info"),
        _ => EnvFilter::new("cmake_query=debug"),
    });

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}

/// Command-line flags take precedence over the config file
fn apply_overrides(cli: &Cli, config: &mut Config) {
    if cli.reuse_reply {
        config.cmake.always_regenerate = false;
    }
    if let Some(secs) = cli.timeout {
        config.cmake.timeout_secs = Some(secs);
    }
}
