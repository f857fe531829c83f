//! `auth-manager` command-line host.
//!
//! Loads the YAML configuration, registers the static plugin, initializes
//! the auth manager gateway, and answers one query per invocation.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod cli;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use auth_manager_gw::init_auth_manager;
use auth_manager_sdk::{AuthManager, AuthManagerPluginRegistry, DagRegistry};
use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches};
use static_auth_plugin::StaticAuthPlugin;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG_PATH};
use crate::config::AppConfig;

/// Config path given on the command line, read before plugin subcommands
/// are known. The flag means the file must exist.
fn config_path() -> (PathBuf, bool) {
    let explicit = Cli::command()
        .ignore_errors(true)
        .allow_external_subcommands(true)
        .try_get_matches()
        .ok()
        .filter(|m| m.value_source("config") == Some(ValueSource::CommandLine))
        .and_then(|m| m.get_one::<PathBuf>("config").cloned());
    match explicit {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(
    api: &dyn AuthManager,
    dags: &dyn DagRegistry,
    command: &Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Whoami => println!("{}", cli::whoami(api).await?),
        Commands::Check(args) => {
            let subject = cli::resolve_subject(api, &args.subject).await;
            let allowed = cli::check(api, args, subject.as_ref()).await?;
            println!("{}", if allowed { "allowed" } else { "denied" });
        }
        Commands::PermittedDags(args) => {
            let subject = cli::resolve_subject(api, &args.subject).await;
            for dag_id in cli::permitted_dags(api, dags, args, subject.as_ref()).await? {
                println!("{dag_id}");
            }
        }
        Commands::Menu(args) => {
            let subject = cli::resolve_subject(api, &args.subject).await;
            for item in cli::menu(api, args, subject.as_ref()).await {
                println!("{item}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (path, required) = config_path();
    let cfg = AppConfig::load(&path, required)?;
    init_logging(&cfg.logging.level);
    tracing::debug!(config = %path.display(), "Configuration loaded");

    let registry = Arc::new(AuthManagerPluginRegistry::new());
    StaticAuthPlugin::default().init(&cfg.static_auth_plugin, &registry)?;
    let api = init_auth_manager(&cfg.auth_manager, registry).await?;
    let dags = StaticAuthPlugin::dag_registry(&cfg.static_auth_plugin);

    let plugin_commands = api.cli_commands();
    let plugin_names: Vec<String> = plugin_commands
        .iter()
        .map(|c| c.get_name().to_owned())
        .collect();
    let matches = Cli::command().subcommands(plugin_commands).get_matches();

    if let Some((name, sub_matches)) = matches.subcommand()
        && plugin_names.iter().any(|n| n == name)
    {
        println!("{}", api.run_cli_command(name, sub_matches).await?);
        return Ok(());
    }

    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    tracing::debug!(config = %cli.config.display(), command = ?cli.command, "Running command");
    run(api.as_ref(), &dags, &cli.command).await
}
