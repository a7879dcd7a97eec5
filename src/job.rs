//! Job model and scan metrics
//!
//! A `Job` ties the engine-assigned id back to the artifact it analyzes.
//! `ScanInfo` holds the extended metrics the engine returns for a
//! completed job, parsed from its `KEY=value` info transcript.

use serde::{Deserialize, Serialize};

use crate::state::ScanState;

/// One submitted analysis job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Opaque id assigned by the engine at submission
    pub id: String,
    /// Name of the artifact this job analyzes; absent for jobs resumed
    /// from the service's outstanding-job list
    pub artifact: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            artifact: Some(artifact.into()),
        }
    }

    /// Job picked up from the service without a local submission.
    pub fn resumed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            artifact: None,
        }
    }
}

/// Extended metrics for a completed job.
///
/// The engine's info transcript looks like:
///
/// ```text
/// NLowIssues=0
/// NHighIssues=2
/// Name=appscan.zip
/// Progress=100
/// JobStatus=6
/// NInfoIssues=0
/// UserMessage=Scan completed successfully. The report is ready.
/// NMediumIssues=1
/// ```
///
/// Keys we do not use are ignored; unparsable counts fall back to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanInfo {
    /// Informational-severity issue count
    pub info_issues: u32,
    /// Low-severity issue count
    pub low_issues: u32,
    /// Medium-severity issue count
    pub medium_issues: u32,
    /// High-severity issue count
    pub high_issues: u32,
    /// Numeric progress, 0-100
    pub progress: u32,
    /// Display name of the job on the service
    pub name: String,
    /// Human-readable message from the engine
    pub user_message: String,
}

impl Default for ScanInfo {
    fn default() -> Self {
        Self {
            info_issues: 0,
            low_issues: 0,
            medium_issues: 0,
            high_issues: 0,
            // a job only reaches info() once completed
            progress: 100,
            name: String::new(),
            user_message: String::new(),
        }
    }
}

impl ScanInfo {
    /// Parse an info transcript into metrics.
    pub fn parse(transcript: &str) -> Self {
        let mut info = ScanInfo::default();

        for line in transcript.lines() {
            let Some((key, value)) = parse_key_eq_val(line) else {
                continue;
            };

            match key {
                "NInfoIssues" => info.info_issues = value.parse().unwrap_or(0),
                "NLowIssues" => info.low_issues = value.parse().unwrap_or(0),
                "NMediumIssues" => info.medium_issues = value.parse().unwrap_or(0),
                "NHighIssues" => info.high_issues = value.parse().unwrap_or(0),
                "Progress" => info.progress = value.parse().unwrap_or(0),
                "Name" => info.name = value.to_string(),
                "UserMessage" => info.user_message = value.to_string(),
                _ => {}
            }
        }

        info
    }

    /// Total issues across all severities.
    pub fn total_issues(&self) -> u32 {
        self.info_issues + self.low_issues + self.medium_issues + self.high_issues
    }
}

/// Split a `KEY=value` line at the first `=`.
fn parse_key_eq_val(line: &str) -> Option<(&str, &str)> {
    let eq = line.find('=')?;
    Some((&line[..eq], &line[eq + 1..]))
}

/// How a job's poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job reached a terminal state; metrics were fetched once.
    Finished {
        job: Job,
        state: ScanState,
        info: ScanInfo,
    },
    /// A status query failed (stale or invalid id); polling was abandoned
    /// for this job without sinking the rest of the batch.
    Unresolved { job: Job },
}

impl JobOutcome {
    /// Job id this outcome belongs to.
    pub fn job_id(&self) -> &str {
        match self {
            JobOutcome::Finished { job, .. } | JobOutcome::Unresolved { job } => &job.id,
        }
    }

    /// Success is always derived from the terminal state, never stored.
    pub fn is_successful(&self) -> bool {
        match self {
            JobOutcome::Finished { state, .. } => state.is_successful(),
            JobOutcome::Unresolved { .. } => false,
        }
    }
}
