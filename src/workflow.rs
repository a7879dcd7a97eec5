//! Job workflow engine
//!
//! The core of the lane: submit prepared artifacts as analysis jobs,
//! poll every job to a terminal state, report outcomes, and clean up on
//! request. Collaborators (analysis client, reporter, dashboard resolver)
//! are injected so the whole engine runs against test doubles.

use std::fs;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::client::{AnalysisClient, ClientError};
use crate::job::{Job, JobOutcome};
use crate::report::Reporter;
use crate::state::ScanState;

/// Default base name for submissions.
pub const DEFAULT_SCAN_NAME: &str = "staticscan";

/// Line marker separating upload progress from assigned job ids in a
/// submission transcript.
pub const TRANSFER_COMPLETE_MARKER: &str = "100% transferred";

/// Default wait between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Workflow engine errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no artifacts to analyze")]
    NoArtifacts,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Resolves the service dashboard URL for success reports.
pub trait DashboardResolver {
    fn resolve(&self) -> Option<String>;
}

/// Constant resolver, for tests and for runs where the dashboard was
/// looked up ahead of time.
pub struct FixedDashboard(pub Option<String>);

impl DashboardResolver for FixedDashboard {
    fn resolve(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Tunables for one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Base submission name; an index suffix keeps names unique per batch
    pub scan_name: String,
    /// Optional application version folded into the submission name
    pub version: Option<String>,
    /// Wait between status polls
    pub poll_interval: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            scan_name: DEFAULT_SCAN_NAME.to_string(),
            version: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// The workflow engine.
pub struct ScanWorkflow<'a> {
    client: &'a dyn AnalysisClient,
    reporter: &'a dyn Reporter,
    dashboard: &'a dyn DashboardResolver,
    config: WorkflowConfig,
}

impl<'a> ScanWorkflow<'a> {
    pub fn new(
        client: &'a dyn AnalysisClient,
        reporter: &'a dyn Reporter,
        dashboard: &'a dyn DashboardResolver,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            client,
            reporter,
            dashboard,
            config,
        }
    }

    /// Submission name for the artifact at `index`:
    /// `<base>[-<version>]-<index>`.
    fn submission_name(&self, index: usize) -> String {
        match &self.config.version {
            Some(version) => format!("{}-{}-{}", self.config.scan_name, version, index),
            None => format!("{}-{}", self.config.scan_name, index),
        }
    }

    /// Submit every artifact as an analysis job.
    ///
    /// Returns the jobs whose ids appeared in the submission transcripts.
    /// An artifact whose transcript never shows the transfer-completion
    /// marker contributes no job, so the result can be shorter than the
    /// artifact list.
    pub fn submit(&self, artifacts: &[String]) -> Result<Vec<Job>, WorkflowError> {
        if artifacts.is_empty() {
            return Err(WorkflowError::NoArtifacts);
        }

        let mut jobs = Vec::new();
        for (index, artifact) in artifacts.iter().enumerate() {
            let scan_name = self.submission_name(index);
            let transcript = self.client.submit(artifact, &scan_name)?;

            for id in parse_submission_transcript(&transcript) {
                self.reporter.info(&format!(
                    "Job for file {} was submitted as scan {} and assigned id {}",
                    artifact, scan_name, id
                ));
                jobs.push(Job::new(id, artifact.clone()));
            }
        }

        Ok(jobs)
    }

    /// Poll every job to a terminal state, strictly one job at a time.
    ///
    /// A failing status or info query abandons that job only; the rest of
    /// the batch still gets polled to completion. There is no overall
    /// timeout; the surrounding job runner owns wall-clock limits.
    pub fn wait(&self, jobs: &[Job]) -> Vec<JobOutcome> {
        jobs.iter().map(|job| self.wait_for_job(job)).collect()
    }

    fn wait_for_job(&self, job: &Job) -> JobOutcome {
        loop {
            // stale or invalid id: abandon this job, keep the batch going
            let state = match self.client.status(&job.id) {
                Ok(code) => ScanState::from_code(code),
                Err(_) => return JobOutcome::Unresolved { job: job.clone() },
            };

            self.reporter
                .info(&format!("Job {} in state {}", job.id, state.name()));

            if !state.is_completed() {
                std::thread::sleep(self.config.poll_interval);
                continue;
            }

            // terminal: fetch metrics exactly once
            let info = match self.client.info(&job.id) {
                Ok(info) => info,
                Err(_) => return JobOutcome::Unresolved { job: job.clone() },
            };

            if state.is_successful() {
                self.reporter
                    .info(&format!("Analysis successful ({})", info.name));
                if let Some(url) = self.dashboard.resolve() {
                    self.reporter.highlight(&[
                        format!("Analysis successful for job \"{}\"", info.name),
                        format!("See current state and output at: {}", url),
                    ]);
                }
            } else {
                self.reporter
                    .info(&format!("Analysis unsuccessful ({})", info.name));
            }

            return JobOutcome::Finished {
                job: job.clone(),
                state,
                info,
            };
        }
    }

    /// Best-effort cleanup: cancel every job on the service and delete
    /// every submitted artifact plus its companion log. Nothing here can
    /// fail the run.
    pub fn cleanup(&self, jobs: &[Job], artifacts: &[String]) {
        self.reporter.info("Cleaning up");

        // fire and forget; a failed cancel never affects the run outcome
        for job in jobs {
            let _ = self.client.cancel(&job.id);
        }

        for artifact in artifacts {
            remove_if_present(Path::new(artifact));
            remove_if_present(Path::new(&format!("{}.log", artifact)));
        }
    }
}

/// Extract job ids from a submission transcript.
///
/// Only non-blank lines strictly after the transfer-completion marker
/// count as ids; a transcript without the marker yields nothing.
pub fn parse_submission_transcript(transcript: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut transferred = false;

    for line in transcript.lines() {
        if line.contains(TRANSFER_COMPLETE_MARKER) {
            transferred = true;
        } else if transferred && !line.is_empty() {
            ids.push(line.to_string());
        }
    }

    ids
}

fn remove_if_present(path: &Path) {
    if path.is_file() {
        let _ = fs::remove_file(path);
    }
}
