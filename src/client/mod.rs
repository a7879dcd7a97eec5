//! Analysis Tool Client
//!
//! Narrow interface over the static-analysis engine. The workflow engine
//! only ever talks to this trait; the real implementation shells out to
//! the engine CLI and scrapes its text output, the mock returns scripted
//! transcripts.

mod appscan;

pub use appscan::AppscanCli;

use thiserror::Error;

use crate::job::ScanInfo;

/// Analysis tool client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("login to the static analysis service was rejected")]
    Auth,

    #[error("artifact preparation produced nothing analyzable: {0}")]
    PrepareFailed(String),

    #[error("job id {0} is invalid or unknown to the service")]
    InvalidJobId(String),

    #[error("analysis tool invocation failed: {0}")]
    Tool(String),

    #[error(transparent)]
    Exec(#[from] crate::exec::ExecError),
}

/// Operations the workflow engine needs from the analysis engine.
pub trait AnalysisClient {
    /// Authenticate for subsequent calls.
    fn login(&self, user_id: &str, password: &str) -> Result<(), ClientError>;

    /// Produce submission artifacts from the working directory, returning
    /// their names. Side effect: creates files on disk.
    fn prepare(&self) -> Result<Vec<String>, ClientError>;

    /// Upload one artifact under the given submission name, returning the
    /// raw submission transcript for the workflow to parse.
    fn submit(&self, artifact: &str, scan_name: &str) -> Result<String, ClientError>;

    /// Current numeric state code for a job.
    fn status(&self, job_id: &str) -> Result<i32, ClientError>;

    /// Extended metrics for a job; meaningful once the job completed.
    fn info(&self, job_id: &str) -> Result<ScanInfo, ClientError>;

    /// Ask the service to cancel a job. Callers treat this as
    /// fire-and-forget.
    fn cancel(&self, job_id: &str) -> Result<(), ClientError>;

    /// Ids of all outstanding jobs on the service.
    fn list(&self) -> Result<Vec<String>, ClientError>;
}
