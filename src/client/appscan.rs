//! Real analysis engine client, shelling out to `appscan.sh`.
//!
//! Every operation is one CLI invocation whose text output gets scraped.
//! The prepare step does not say which files it wrote, so new artifacts
//! are discovered by diffing the working directory before and after.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::exec::CommandRunner;
use crate::job::ScanInfo;

use super::{AnalysisClient, ClientError};

/// Marker the login transcript must contain.
const LOGIN_OK_MARKER: &str = "Authenticated successfully.";

/// Marker the prepare transcript must contain.
const PREPARE_OK_MARKER: &str = "IRX file generation successful";

/// Marker the list transcript shows when no jobs exist.
const NO_JOBS_MARKER: &str = "No analysis jobs";

/// Marker the status stderr shows for an unknown job id.
const INVALID_REQUEST_MARKER: &str = "request is invalid";

/// Extension of prepared submission artifacts.
const ARTIFACT_EXTENSION: &str = "irx";

/// `appscan.sh`-backed client.
pub struct AppscanCli<R: CommandRunner> {
    runner: R,
    /// Directory the prepare step writes artifacts into
    work_dir: PathBuf,
}

impl<R: CommandRunner> AppscanCli<R> {
    pub fn new(runner: R) -> Self {
        Self::with_work_dir(runner, PathBuf::from("."))
    }

    pub fn with_work_dir(runner: R, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            work_dir: work_dir.into(),
        }
    }

    fn artifact_names(&self) -> Result<HashSet<String>, ClientError> {
        let mut names = HashSet::new();
        let entries = fs::read_dir(&self.work_dir)
            .map_err(|e| ClientError::Tool(format!("cannot list work dir: {}", e)))?;
        for entry in entries {
            let entry = entry.map_err(|e| ClientError::Tool(e.to_string()))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

impl<R: CommandRunner> AnalysisClient for AppscanCli<R> {
    fn login(&self, user_id: &str, password: &str) -> Result<(), ClientError> {
        let output = self
            .runner
            .run(&format!("appscan.sh login -u {} -P {}", user_id, password))?;

        if output.stdout.contains(LOGIN_OK_MARKER) {
            Ok(())
        } else {
            Err(ClientError::Auth)
        }
    }

    fn prepare(&self) -> Result<Vec<String>, ClientError> {
        // prepare doesn't name the file it wrote; diff the directory
        let before = self.artifact_names()?;

        let output = self.runner.run("appscan.sh prepare")?;
        if !output.stdout.contains(PREPARE_OK_MARKER) {
            return Err(ClientError::PrepareFailed(output.stderr));
        }

        let after = self.artifact_names()?;
        let mut fresh: Vec<String> = after.difference(&before).cloned().collect();
        fresh.sort();
        Ok(fresh)
    }

    fn submit(&self, artifact: &str, scan_name: &str) -> Result<String, ClientError> {
        let output = self.runner.run(&format!(
            "appscan.sh queue_analysis -f {} -n {}",
            artifact, scan_name
        ))?;
        Ok(output.stdout)
    }

    fn status(&self, job_id: &str) -> Result<i32, ClientError> {
        let output = self.runner.run(&format!("appscan.sh status -i {}", job_id))?;

        if output.stderr.contains(INVALID_REQUEST_MARKER) {
            return Err(ClientError::InvalidJobId(job_id.to_string()));
        }

        output
            .stdout
            .trim()
            .parse::<i32>()
            .map_err(|_| ClientError::InvalidJobId(job_id.to_string()))
    }

    fn info(&self, job_id: &str) -> Result<ScanInfo, ClientError> {
        let output = self.runner.run(&format!("appscan.sh info -i {}", job_id))?;
        Ok(ScanInfo::parse(&output.stdout))
    }

    fn cancel(&self, job_id: &str) -> Result<(), ClientError> {
        self.runner.run(&format!("appscan.sh cancel -i {}", job_id))?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, ClientError> {
        let output = self.runner.run("appscan.sh list")?;

        let mut jobs = Vec::new();
        for line in output.stdout.lines() {
            if line.contains(NO_JOBS_MARKER) {
                return Ok(Vec::new());
            }
            if !line.is_empty() {
                jobs.push(line.to_string());
            }
        }
        Ok(jobs)
    }
}
