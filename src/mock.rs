//! Scripted analysis client for tests
//!
//! In-process stand-in for the analysis engine CLI. Tests script status
//! sequences and transcripts up front, then assert on the calls the
//! workflow engine made.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use crate::client::{AnalysisClient, ClientError};
use crate::job::ScanInfo;

/// Everything the mock was asked to do, in call order where it matters.
#[derive(Debug, Default)]
struct CallLog {
    logins: Vec<(String, String)>,
    submits: Vec<(String, String)>,
    status_calls: Vec<String>,
    info_calls: Vec<String>,
    cancel_calls: Vec<String>,
}

#[derive(Default)]
struct MockState {
    /// Scripted status codes per job id; the last code repeats once the
    /// script is exhausted
    statuses: HashMap<String, VecDeque<i32>>,
    /// Job ids whose status query fails as invalid
    invalid_ids: HashSet<String>,
    /// Canned submission transcripts per artifact name
    transcripts: HashMap<String, String>,
    /// Canned info transcripts per job id
    infos: HashMap<String, ScanInfo>,
    /// Outstanding jobs returned by list()
    outstanding: Vec<String>,
    /// Artifacts returned by prepare()
    prepared: Vec<String>,
    reject_login: bool,
    fail_prepare: bool,
    fail_cancel: bool,
    log: CallLog,
}

/// Configurable mock analysis client.
#[derive(Default)]
pub struct MockAnalysisClient {
    state: Mutex<MockState>,
}

impl MockAnalysisClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the sequence of status codes a job reports. The final code
    /// repeats if polled again.
    pub fn script_status(&self, job_id: &str, codes: &[i32]) {
        self.lock().statuses.insert(job_id.to_string(), codes.iter().copied().collect());
    }

    /// Make every status query for this job id fail as invalid.
    pub fn fail_status(&self, job_id: &str) {
        self.lock().invalid_ids.insert(job_id.to_string());
    }

    /// Canned submission transcript for an artifact.
    pub fn set_transcript(&self, artifact: &str, transcript: &str) {
        self.lock()
            .transcripts
            .insert(artifact.to_string(), transcript.to_string());
    }

    /// Canned info for a job id.
    pub fn set_info(&self, job_id: &str, info: ScanInfo) {
        self.lock().infos.insert(job_id.to_string(), info);
    }

    /// Job ids returned by `list()`.
    pub fn set_outstanding(&self, ids: &[&str]) {
        self.lock().outstanding = ids.iter().map(|s| s.to_string()).collect();
    }

    /// Artifacts returned by `prepare()`.
    pub fn set_prepared(&self, artifacts: &[&str]) {
        self.lock().prepared = artifacts.iter().map(|s| s.to_string()).collect();
    }

    /// Reject the next and all further logins.
    pub fn reject_login(&self) {
        self.lock().reject_login = true;
    }

    /// Make `prepare()` fail.
    pub fn fail_prepare(&self) {
        self.lock().fail_prepare = true;
    }

    /// Make `cancel()` return an error (callers must swallow it).
    pub fn fail_cancel(&self) {
        self.lock().fail_cancel = true;
    }

    // ---- recorded-call accessors ----

    pub fn login_calls(&self) -> Vec<(String, String)> {
        self.lock().log.logins.clone()
    }

    /// (artifact, submission name) pairs, in submission order.
    pub fn submit_calls(&self) -> Vec<(String, String)> {
        self.lock().log.submits.clone()
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.lock().log.status_calls.clone()
    }

    pub fn info_calls(&self) -> Vec<String> {
        self.lock().log.info_calls.clone()
    }

    pub fn cancel_calls(&self) -> Vec<String> {
        self.lock().log.cancel_calls.clone()
    }

    /// Number of info fetches recorded for one job.
    pub fn info_call_count(&self, job_id: &str) -> usize {
        self.lock()
            .log
            .info_calls
            .iter()
            .filter(|id| id.as_str() == job_id)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock poisoned")
    }
}

impl AnalysisClient for MockAnalysisClient {
    fn login(&self, user_id: &str, password: &str) -> Result<(), ClientError> {
        let mut state = self.lock();
        state
            .log
            .logins
            .push((user_id.to_string(), password.to_string()));
        if state.reject_login {
            Err(ClientError::Auth)
        } else {
            Ok(())
        }
    }

    fn prepare(&self) -> Result<Vec<String>, ClientError> {
        let state = self.lock();
        if state.fail_prepare {
            return Err(ClientError::PrepareFailed("scripted failure".to_string()));
        }
        Ok(state.prepared.clone())
    }

    fn submit(&self, artifact: &str, scan_name: &str) -> Result<String, ClientError> {
        let mut state = self.lock();
        state
            .log
            .submits
            .push((artifact.to_string(), scan_name.to_string()));

        // default transcript assigns one id derived from the artifact name
        let transcript = state
            .transcripts
            .get(artifact)
            .cloned()
            .unwrap_or_else(|| format!("100% transferred\n{}-job\n", artifact));
        Ok(transcript)
    }

    fn status(&self, job_id: &str) -> Result<i32, ClientError> {
        let mut state = self.lock();
        state.log.status_calls.push(job_id.to_string());

        if state.invalid_ids.contains(job_id) {
            return Err(ClientError::InvalidJobId(job_id.to_string()));
        }

        let script = state
            .statuses
            .get_mut(job_id)
            .ok_or_else(|| ClientError::InvalidJobId(job_id.to_string()))?;

        match script.len() {
            0 => Err(ClientError::InvalidJobId(job_id.to_string())),
            1 => Ok(script[0]),
            _ => Ok(script.pop_front().unwrap_or_default()),
        }
    }

    fn info(&self, job_id: &str) -> Result<ScanInfo, ClientError> {
        let mut state = self.lock();
        state.log.info_calls.push(job_id.to_string());

        Ok(state.infos.get(job_id).cloned().unwrap_or_else(|| ScanInfo {
            name: job_id.to_string(),
            ..ScanInfo::default()
        }))
    }

    fn cancel(&self, job_id: &str) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.log.cancel_calls.push(job_id.to_string());

        if state.fail_cancel {
            Err(ClientError::Tool("scripted cancel failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn list(&self) -> Result<Vec<String>, ClientError> {
        Ok(self.lock().outstanding.clone())
    }
}
