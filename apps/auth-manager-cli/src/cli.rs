//! Command-line surface and built-in query commands.

use std::path::PathBuf;

use anyhow::Context;
use auth_manager_sdk::{
    AccessView, AuthManager, ConfigurationDetails, ConnectionDetails, CustomMethod,
    DagAccessEntity, DagDetails, DagRegistry, DatasetDetails, MenuItem, PoolDetails, ResourceKind,
    ResourceMethod, Subject, VariableDetails,
};
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_CONFIG_PATH: &str = "config/auth-manager.yaml";

#[derive(Debug, Parser)]
#[command(
    name = "auth-manager",
    bin_name = "auth-manager",
    about = "Query the configured auth manager",
    version
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the signed-in subject
    Whoami,
    /// Decide a single authorization check
    Check(CheckArgs),
    /// List the DAG ids the subject may act on
    PermittedDags(PermittedDagsArgs),
    /// Show which menu entries the subject may open
    Menu(MenuArgs),
}

#[derive(Debug, Args)]
pub struct SubjectArgs {
    /// Decide for this subject instead of the signed-in one
    #[arg(long = "as", value_name = "NAME")]
    pub as_subject: Option<String>,

    /// Id of the `--as` subject; required when the backend configures one
    #[arg(long = "as-id", value_name = "ID", requires = "as_subject")]
    pub as_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Resource kind, e.g. `dag` or `custom_view`
    #[arg(long)]
    pub resource: ResourceKind,

    /// Method; custom views also accept plugin-defined names
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Instance id; names the view for `view` and `custom_view`
    #[arg(long)]
    pub id: Option<String>,

    /// DAG sub-entity, e.g. `task_logs`
    #[arg(long)]
    pub access_entity: Option<DagAccessEntity>,

    #[command(flatten)]
    pub subject: SubjectArgs,
}

#[derive(Debug, Args)]
pub struct PermittedDagsArgs {
    /// Method to check; repeat for several. Defaults to GET and PUT
    #[arg(long = "method", value_name = "METHOD")]
    pub methods: Vec<ResourceMethod>,

    #[command(flatten)]
    pub subject: SubjectArgs,
}

#[derive(Debug, Args)]
pub struct MenuArgs {
    /// Menu entry names, i.e. the custom views guarding them
    #[arg(required = true)]
    pub items: Vec<String>,

    #[command(flatten)]
    pub subject: SubjectArgs,
}

/// The subject a query is decided for.
pub async fn resolve_subject(api: &dyn AuthManager, args: &SubjectArgs) -> Option<Subject> {
    match &args.as_subject {
        Some(name) => Some(Subject {
            id: args.as_id.clone(),
            name: name.clone(),
        }),
        None => api.get_subject().await,
    }
}

/// # Errors
///
/// Fails only if the backend cannot report the subject id.
pub async fn whoami(api: &dyn AuthManager) -> anyhow::Result<String> {
    if !api.is_logged_in().await {
        return Ok("anonymous".to_owned());
    }
    let name = api.get_subject_name().await?;
    Ok(match api.get_subject_id().await? {
        Some(id) => format!("{name} ({id})"),
        None => name,
    })
}

fn standard_method(raw: &str) -> anyhow::Result<ResourceMethod> {
    Ok(raw.parse::<ResourceMethod>()?)
}

/// Decide the check described by `args`.
///
/// # Errors
///
/// Fails if the arguments do not describe a valid check for the resource kind.
pub async fn check(
    api: &dyn AuthManager,
    args: &CheckArgs,
    subject: Option<&Subject>,
) -> anyhow::Result<bool> {
    if args.access_entity.is_some() && args.resource != ResourceKind::Dag {
        anyhow::bail!("--access-entity only applies to dags");
    }
    let id = args.id.clone();

    let allowed = match args.resource {
        ResourceKind::Configuration => {
            let details = id.map(|section| ConfigurationDetails {
                section: Some(section),
            });
            api.is_authorized_configuration(standard_method(&args.method)?, details.as_ref(), subject)
                .await
        }
        ResourceKind::Connection => {
            let details = id.map(|conn_id| ConnectionDetails {
                conn_id: Some(conn_id),
            });
            api.is_authorized_connection(standard_method(&args.method)?, details.as_ref(), subject)
                .await
        }
        ResourceKind::Dag => {
            let details = (id.is_some() || args.access_entity.is_some()).then(|| DagDetails {
                id,
                access_entity: args.access_entity,
            });
            api.is_authorized_dag(standard_method(&args.method)?, details.as_ref(), subject)
                .await
        }
        ResourceKind::Dataset => {
            let details = id.map(|uri| DatasetDetails { uri: Some(uri) });
            api.is_authorized_dataset(standard_method(&args.method)?, details.as_ref(), subject)
                .await
        }
        ResourceKind::Pool => {
            let details = id.map(|name| PoolDetails { name: Some(name) });
            api.is_authorized_pool(standard_method(&args.method)?, details.as_ref(), subject)
                .await
        }
        ResourceKind::Variable => {
            let details = id.map(|key| VariableDetails { key: Some(key) });
            api.is_authorized_variable(standard_method(&args.method)?, details.as_ref(), subject)
                .await
        }
        ResourceKind::View => {
            let view: AccessView = id
                .context("--id must name the access view")?
                .parse()
                .map_err(anyhow::Error::msg)?;
            api.is_authorized_view(view, subject).await
        }
        ResourceKind::CustomView => {
            let name = id.context("--id must name the custom view")?;
            let method = CustomMethod::from(args.method.as_str());
            api.is_authorized_custom_view(&method, &name, subject).await
        }
    };
    Ok(allowed)
}

/// # Errors
///
/// Fails if the DAG registry cannot list the DAG ids.
pub async fn permitted_dags(
    api: &dyn AuthManager,
    registry: &dyn DagRegistry,
    args: &PermittedDagsArgs,
    subject: Option<&Subject>,
) -> anyhow::Result<Vec<String>> {
    let permitted = api
        .get_permitted_dag_ids(registry, &args.methods, subject)
        .await?;
    Ok(permitted.into_iter().collect())
}

pub async fn menu(api: &dyn AuthManager, args: &MenuArgs, subject: Option<&Subject>) -> Vec<String> {
    let items = args
        .items
        .iter()
        .map(|name| MenuItem::new(name.as_str(), name.as_str()))
        .collect();
    api.filter_permitted_menu_items(items, subject)
        .await
        .into_iter()
        .map(|item| item.name)
        .collect()
}
