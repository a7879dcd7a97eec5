//! Batch summary artifact (scan_summary.json)
//!
//! Machine-readable record of one lane invocation, written next to the
//! env file so later pipeline stages can gate on scan results without
//! re-scraping console output.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::{JobOutcome, ScanInfo};

/// Schema identifier for scan_summary.json
pub const SUMMARY_SCHEMA_ID: &str = "scan-lane/summary@1";

/// Per-job record in the batch summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Engine-assigned job id
    pub job_id: String,

    /// Artifact the job analyzed, when submitted by this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,

    /// Terminal state name, or "Unresolved" when polling was abandoned
    pub state: String,

    /// Raw engine state code for unknown states
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_state_code: Option<i32>,

    /// Whether the terminal state classifies as successful
    pub successful: bool,

    /// Metrics fetched on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<ScanInfo>,
}

/// Summary of one whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Schema identifier
    pub schema_id: String,

    /// When the summary was written
    pub generated_at: DateTime<Utc>,

    /// Jobs tracked in this batch
    pub total_jobs: usize,

    /// Jobs whose terminal state classifies as successful
    pub successful: usize,

    /// Jobs that completed without success
    pub unsuccessful: usize,

    /// Jobs abandoned because their status could not be queried
    pub unresolved: usize,

    /// Per-job records, in batch order
    pub jobs: Vec<JobRecord>,
}

impl BatchSummary {
    /// Aggregate poll outcomes into a summary.
    pub fn from_outcomes(outcomes: &[JobOutcome]) -> Self {
        let jobs: Vec<JobRecord> = outcomes
            .iter()
            .map(|outcome| match outcome {
                JobOutcome::Finished { job, state, info } => JobRecord {
                    job_id: job.id.clone(),
                    artifact: job.artifact.clone(),
                    state: state.name().to_string(),
                    raw_state_code: match state {
                        crate::state::ScanState::Unknown(code) => Some(*code),
                        _ => None,
                    },
                    successful: state.is_successful(),
                    info: Some(info.clone()),
                },
                JobOutcome::Unresolved { job } => JobRecord {
                    job_id: job.id.clone(),
                    artifact: job.artifact.clone(),
                    state: "Unresolved".to_string(),
                    raw_state_code: None,
                    successful: false,
                    info: None,
                },
            })
            .collect();

        let successful = jobs.iter().filter(|j| j.successful).count();
        let unresolved = jobs.iter().filter(|j| j.state == "Unresolved").count();

        Self {
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            generated_at: Utc::now(),
            total_jobs: jobs.len(),
            successful,
            unsuccessful: jobs.len() - successful - unresolved,
            unresolved,
            jobs,
        }
    }

    /// Whether every tracked job finished successfully.
    pub fn all_successful(&self) -> bool {
        self.successful == self.total_jobs
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write atomically (write-then-rename) to the given path.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &json)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}
