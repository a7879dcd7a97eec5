//! Environment-driven configuration
//!
//! The job runner communicates through environment variables; there is no
//! config file. Everything has a default, so an empty environment yields
//! a usable configuration.

use std::env;
use std::time::Duration;

use crate::workflow::{DEFAULT_POLL_INTERVAL, DEFAULT_SCAN_NAME, WorkflowConfig};

/// Lane configuration resolved from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base submission name (`SUBMISSION_NAME`)
    pub scan_name: String,
    /// Version suffix folded into submission names (`APPLICATION_VERSION`)
    pub version: Option<String>,
    /// Whether the job may provision the service/space itself
    /// (`SETUP_SERVICE_SPACE=true`)
    pub setup_space: bool,
    /// Whether debug reporting is enabled (`DEBUG` set to a non-empty
    /// value)
    pub debug: bool,
    /// Wait between status polls (`SCAN_POLL_INTERVAL_SECS`)
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_name: DEFAULT_SCAN_NAME.to_string(),
            version: None,
            setup_space: false,
            debug: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        let scan_name = non_empty(env::var("SUBMISSION_NAME").ok())
            .unwrap_or_else(|| DEFAULT_SCAN_NAME.to_string());
        let version = non_empty(env::var("APPLICATION_VERSION").ok());
        let setup_space = env::var("SETUP_SERVICE_SPACE")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let debug = non_empty(env::var("DEBUG").ok()).is_some();
        let poll_interval = env::var("SCAN_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        Self {
            scan_name,
            version,
            setup_space,
            debug,
            poll_interval,
        }
    }

    /// Workflow tunables derived from this configuration.
    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            scan_name: self.scan_name.clone(),
            version: self.version.clone(),
            poll_interval: self.poll_interval,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan_name, "staticscan");
        assert_eq!(config.version, None);
        assert!(!config.setup_space);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_workflow_config_carries_fields() {
        let config = Config {
            scan_name: "myscan".to_string(),
            version: Some("1.2".to_string()),
            poll_interval: Duration::from_secs(1),
            ..Config::default()
        };
        let wf = config.workflow();
        assert_eq!(wf.scan_name, "myscan");
        assert_eq!(wf.version.as_deref(), Some("1.2"));
        assert_eq!(wf.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_debug_variable_stays_disabled() {
        // no other test reads DEBUG, so mutating it here is safe
        env::set_var("DEBUG", "");
        assert!(!Config::from_env().debug);

        env::set_var("DEBUG", "1");
        assert!(Config::from_env().debug);

        env::remove_var("DEBUG");
        assert!(!Config::from_env().debug);
    }

    #[test]
    fn test_non_empty_filter() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
