//! `AuthManager` implementation for the static plugin.

use async_trait::async_trait;
use auth_manager_sdk::{
    AccessView, AuthManager, AuthManagerError, AuthorizationRequest, ConfigurationDetails,
    ConnectionDetails, ConnectionRequest, CustomMethod, DagDetails, DagRequest, DatasetDetails,
    PoolDetails, PoolRequest, ResourceDetails, ResourceKind, ResourceMethod, Subject,
    VariableDetails, VariableRequest,
};
use clap::{Arg, ArgMatches, Command};

use super::grants::Check;
use super::service::Service;
use crate::config::AuthMode;

const LIST_GRANTS: &str = "list-grants";

impl Service {
    fn check<D: ResourceDetails>(
        &self,
        method: ResourceMethod,
        details: Option<&D>,
        subject: Option<&Subject>,
    ) -> bool {
        let method = CustomMethod::Standard(method);
        self.is_authorized(&Check::for_details(&method, details), subject)
    }

    // One pass over the table; no per-request await.
    fn check_all<D: ResourceDetails>(&self, requests: &[AuthorizationRequest<D>]) -> bool {
        requests
            .iter()
            .all(|r| self.check(r.method, r.details.as_ref(), r.subject.as_ref()))
    }

    fn list_grants(&self, name: &str) -> String {
        if self.mode() == AuthMode::AllowAll {
            return format!("mode allow_all: every signed-in subject, including '{name}', is allowed everything");
        }
        let Some(grants) = self.grants_of(name) else {
            return format!("subject '{name}' is not configured");
        };
        if grants.is_empty() {
            return format!("subject '{name}' has no grants");
        }
        let lines: Vec<String> = grants
            .iter()
            .map(|grant| format!("  {}", grant.describe()))
            .collect();
        format!("grants of '{name}':\n{}", lines.join("\n"))
    }
}

#[async_trait]
impl AuthManager for Service {
    fn name(&self) -> &str {
        "static"
    }

    async fn init(&self) -> Result<(), AuthManagerError> {
        tracing::info!(mode = self.mode().as_str(), "Static auth manager ready");
        Ok(())
    }

    fn cli_commands(&self) -> Vec<Command> {
        vec![
            Command::new(LIST_GRANTS)
                .about("List the grants configured for a subject")
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .value_name("NAME")
                        .required(true)
                        .help("Subject display name"),
                ),
        ]
    }

    async fn run_cli_command(
        &self,
        name: &str,
        matches: &ArgMatches,
    ) -> Result<String, AuthManagerError> {
        if name != LIST_GRANTS {
            return Err(AuthManagerError::UnknownCommand(name.to_owned()));
        }
        let subject = matches
            .get_one::<String>("subject")
            .ok_or_else(|| AuthManagerError::Internal("missing --subject".to_owned()))?;
        Ok(self.list_grants(subject))
    }

    async fn get_subject(&self) -> Option<Subject> {
        self.current_subject().await
    }

    async fn is_authorized_configuration(
        &self,
        method: ResourceMethod,
        details: Option<&ConfigurationDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_connection(
        &self,
        method: ResourceMethod,
        details: Option<&ConnectionDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_dag(
        &self,
        method: ResourceMethod,
        details: Option<&DagDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_dataset(
        &self,
        method: ResourceMethod,
        details: Option<&DatasetDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_pool(
        &self,
        method: ResourceMethod,
        details: Option<&PoolDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_variable(
        &self,
        method: ResourceMethod,
        details: Option<&VariableDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_view(&self, access_view: AccessView, subject: Option<&Subject>) -> bool {
        let get = CustomMethod::Standard(ResourceMethod::Get);
        self.is_authorized(
            &Check::scoped(ResourceKind::View, &get, access_view.as_str()),
            subject,
        )
    }

    async fn is_authorized_custom_view(
        &self,
        method: &CustomMethod,
        resource_name: &str,
        subject: Option<&Subject>,
    ) -> bool {
        self.is_authorized(
            &Check::scoped(ResourceKind::CustomView, method, resource_name),
            subject,
        )
    }

    async fn batch_is_authorized_connection(&self, requests: &[ConnectionRequest]) -> bool {
        self.check_all(requests)
    }

    async fn batch_is_authorized_dag(&self, requests: &[DagRequest]) -> bool {
        self.check_all(requests)
    }

    async fn batch_is_authorized_pool(&self, requests: &[PoolRequest]) -> bool {
        self.check_all(requests)
    }

    async fn batch_is_authorized_variable(&self, requests: &[VariableRequest]) -> bool {
        self.check_all(requests)
    }
}
