//! Cloud Foundry collaborators
//!
//! Service discovery, dashboard lookup, credential extraction, and space
//! auto-provisioning, all scraped from `cf` CLI output through the
//! `CommandRunner` seam. The parsers live in the submodules as pure
//! functions over text; `CfCli` glues them to the actual commands.

mod credentials;
mod services;

pub use credentials::{credentials_from_env_output, Credentials};
pub use services::{find_bound_app, find_service_name, parse_dashboard};

use thiserror::Error;

use crate::exec::{CommandRunner, ExecError};
use crate::report::Reporter;
use crate::workflow::DashboardResolver;

/// Marketplace name of the static analysis service.
pub const STATIC_ANALYSIS_SERVICE: &str = "Static Analyzer";

/// Plan used when the service instance has to be created.
pub const DEFAULT_SERVICE_PLAN: &str = "free";

/// Name of the placeholder app credentials get bound to.
pub const BRIDGE_APP_NAME: &str = "pipeline_bridge_app";

/// Credential discovery errors. All of these are fatal to the run.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(
        "service \"{0}\" is not loaded and bound in this space; add the service to the space \
         and bind it to an app, or enable automatic space setup for the job"
    )]
    ServiceNotBound(String),

    #[error("unable to access an app bound to the {0} service")]
    NoBoundApp(String),

    #[error("unable to read credential information off the app bound to {0}")]
    EnvReadFailed(String),

    #[error("unable to get bound credentials for access to the static analysis service")]
    MissingCredentials,

    #[error("bound app environment contained malformed JSON: {0}")]
    MalformedEnv(#[from] serde_json::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// `cf` CLI wrapper.
pub struct CfCli<'a, R: CommandRunner> {
    runner: R,
    reporter: &'a dyn Reporter,
    service: String,
}

impl<'a, R: CommandRunner> CfCli<'a, R> {
    pub fn new(runner: R, reporter: &'a dyn Reporter) -> Self {
        Self {
            runner,
            reporter,
            service: STATIC_ANALYSIS_SERVICE.to_string(),
        }
    }

    /// Instance name of the service in this space, if loaded.
    pub fn find_service_name_in_space(&self) -> Result<Option<String>, CredentialError> {
        let output = self.runner.run("cf services")?;
        if !output.success {
            self.reporter
                .info(&format!("Unable to lookup services, error was: {}", output.stdout));
            return Ok(None);
        }
        Ok(find_service_name(&output.stdout, &self.service))
    }

    /// Dashboard URL for the service instance, if resolvable. Any failure
    /// along the way resolves to nothing; the dashboard is informational.
    pub fn find_service_dashboard(&self) -> Option<String> {
        let name = self.find_service_name_in_space().ok().flatten()?;
        let output = self.runner.run(&format!("cf service \"{}\"", name)).ok()?;
        if !output.success {
            return None;
        }
        parse_dashboard(&output.stdout)
    }

    /// First app bound to the service in this space, if any.
    pub fn find_bound_app_for_service(&self) -> Result<Option<String>, CredentialError> {
        let output = self.runner.run("cf services")?;
        if !output.success {
            return Ok(None);
        }

        let bound = find_bound_app(&output.stdout, &self.service);
        match &bound {
            Some(app) => self.reporter.debug(&format!(
                "Found existing app \"{}\" bound to service \"{}\"",
                app, self.service
            )),
            None => self.reporter.debug(&format!(
                "No existing apps found bound to service \"{}\"",
                self.service
            )),
        }
        Ok(bound)
    }

    /// Make sure the bridge app exists, creating it if needed.
    fn check_and_create_bridge_app(&self) -> Result<bool, CredentialError> {
        let output = self.runner.run("cf apps")?;
        if !output.success {
            return Ok(false);
        }

        let prefix = format!("{} ", BRIDGE_APP_NAME);
        if output.stdout.lines().any(|line| line.starts_with(&prefix)) {
            return Ok(true);
        }

        self.reporter
            .info("Bridge app does not exist, attempting to create it");
        let command = format!(
            "cf push {} -i 1 -k 1M -m 64M --no-hostname --no-manifest --no-route --no-start",
            BRIDGE_APP_NAME
        );
        self.reporter.debug(&format!("Executing command \"{}\"", command));
        let output = self.runner.run(&command)?;
        if !output.success {
            self.reporter
                .info(&format!("Unable to create bridge app, error was: {}", output.stdout));
            return Ok(false);
        }
        Ok(true)
    }

    /// Load the service into the space if missing and bind it to the
    /// bridge app. Returns the bound app name on success.
    fn create_bound_app_for_service(&self) -> Result<Option<String>, CredentialError> {
        if !self.check_and_create_bridge_app()? {
            return Ok(None);
        }

        let service_name = match self.find_service_name_in_space()? {
            Some(name) => name,
            None => {
                self.reporter.info(&format!(
                    "Service \"{}\" is not loaded in this space, attempting to load it",
                    self.service
                ));
                let command = format!(
                    "cf create-service \"{}\" \"{}\" \"{}\"",
                    self.service, DEFAULT_SERVICE_PLAN, self.service
                );
                self.reporter.debug(&format!("Executing command \"{}\"", command));
                let output = self.runner.run(&command)?;
                if !output.success {
                    self.reporter.info(&format!(
                        "Unable to create service in this space, error was: {}",
                        output.stdout
                    ));
                    return Ok(None);
                }
                self.service.clone()
            }
        };

        self.reporter.info(&format!(
            "Binding service \"{}\" to app \"{}\"",
            service_name, BRIDGE_APP_NAME
        ));
        let output = self
            .runner
            .run(&format!("cf bind-service {} \"{}\"", BRIDGE_APP_NAME, service_name))?;
        if !output.success {
            self.reporter.info(&format!(
                "Unable to bind service to the bridge app, error was: {}",
                output.stdout
            ));
            return Ok(None);
        }

        Ok(Some(BRIDGE_APP_NAME.to_string()))
    }

    /// Resolve service credentials off a bound app, provisioning the
    /// space first when `setup_space` allows it.
    pub fn resolve_credentials(&self, setup_space: bool) -> Result<Credentials, CredentialError> {
        let mut bound_app = self.find_bound_app_for_service()?;

        if bound_app.is_none() {
            if setup_space {
                bound_app = self.create_bound_app_for_service()?;
            } else {
                return Err(CredentialError::ServiceNotBound(self.service.clone()));
            }
        }

        let bound_app =
            bound_app.ok_or_else(|| CredentialError::NoBoundApp(self.service.clone()))?;

        let output = self.runner.run(&format!("cf env \"{}\"", bound_app))?;
        if !output.success {
            return Err(CredentialError::EnvReadFailed(self.service.clone()));
        }

        credentials_from_env_output(&output.stdout, &self.service)
    }
}

impl<R: CommandRunner> DashboardResolver for CfCli<'_, R> {
    fn resolve(&self) -> Option<String> {
        self.find_service_dashboard()
    }
}
