//! Scan Lane - static analysis gate for Cloud Foundry pipelines
//!
//! This crate implements a pipeline gate that resolves credentials for a
//! bound static-analysis service, drives the analysis engine CLI through
//! a login/prepare/submit/poll workflow, and reports per-job results.

pub mod cf;
pub mod client;
pub mod config;
pub mod envfile;
pub mod exec;
pub mod job;
pub mod mock;
pub mod report;
pub mod state;
pub mod summary;
pub mod workflow;

pub use cf::{CfCli, CredentialError, Credentials};
pub use client::{AnalysisClient, AppscanCli, ClientError};
pub use config::Config;
pub use exec::{CommandOutput, CommandRunner, ShellRunner};
pub use job::{Job, JobOutcome, ScanInfo};
pub use mock::MockAnalysisClient;
pub use report::{ConsoleReporter, MemoryReporter, Reporter};
pub use state::ScanState;
pub use summary::BatchSummary;
pub use workflow::{FixedDashboard, ScanWorkflow, WorkflowConfig, WorkflowError};
