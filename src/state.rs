//! Scan state classification
//!
//! The analysis engine reports job progress as a bare integer code. This
//! module owns the closed set of known codes and the two derived
//! classifications (completed, successful) every downstream decision is
//! based on. Nothing else in the crate computes completion or success.

/// State of a submitted analysis job, as reported by the engine.
///
/// Codes outside the known 0..=13 range map to `Unknown`, which is
/// classified as completed-but-unsuccessful so an engine upgrade that adds
/// new codes can never leave the poll loop spinning forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Job accepted, waiting for an analysis slot
    Pending,
    /// Analysis slot assigned, engine starting up
    Starting,
    /// Analysis in progress
    Running,
    /// Analysis finished cleanly
    FinishedRunning,
    /// Analysis finished but hit errors
    FinishedRunningWithErrors,
    /// Finished, report held for support review
    PendingSupport,
    /// Report ready
    Ready,
    /// Report ready but incomplete
    ReadyIncomplete,
    /// Engine could not scan the artifact
    FailedToScan,
    /// Stopped by an operator
    ManuallyStopped,
    /// No state recorded for the job
    None,
    /// Submission accepted, job record being created
    Initiating,
    /// Submission lacked required configuration
    MissingConfiguration,
    /// Submission may lack required configuration
    PossibleMissingConfiguration,
    /// Code not in the known set; carries the raw code for reporting
    Unknown(i32),
}

impl ScanState {
    /// Map a raw engine state code to a `ScanState`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ScanState::Pending,
            1 => ScanState::Starting,
            2 => ScanState::Running,
            3 => ScanState::FinishedRunning,
            4 => ScanState::FinishedRunningWithErrors,
            5 => ScanState::PendingSupport,
            6 => ScanState::Ready,
            7 => ScanState::ReadyIncomplete,
            8 => ScanState::FailedToScan,
            9 => ScanState::ManuallyStopped,
            10 => ScanState::None,
            11 => ScanState::Initiating,
            12 => ScanState::MissingConfiguration,
            13 => ScanState::PossibleMissingConfiguration,
            other => ScanState::Unknown(other),
        }
    }

    /// Human-readable state name, used in poll progress reporting.
    pub fn name(&self) -> &'static str {
        match self {
            ScanState::Pending => "Pending",
            ScanState::Starting => "Starting",
            ScanState::Running => "Running",
            ScanState::FinishedRunning => "FinishedRunning",
            ScanState::FinishedRunningWithErrors => "FinishedRunningWithErrors",
            ScanState::PendingSupport => "PendingSupport",
            ScanState::Ready => "Ready",
            ScanState::ReadyIncomplete => "ReadyIncomplete",
            ScanState::FailedToScan => "FailedToScan",
            ScanState::ManuallyStopped => "ManuallyStopped",
            ScanState::None => "None",
            ScanState::Initiating => "Initiating",
            ScanState::MissingConfiguration => "MissingConfiguration",
            ScanState::PossibleMissingConfiguration => "PossibleMissingConfiguration",
            ScanState::Unknown(_) => "Unknown",
        }
    }

    /// Whether the job has reached a terminal state and polling stops.
    ///
    /// Unknown codes classify as completed; treating them as in-flight
    /// would poll forever against a code we cannot interpret.
    pub fn is_completed(&self) -> bool {
        !matches!(
            self,
            ScanState::Pending | ScanState::Starting | ScanState::Running | ScanState::Initiating
        )
    }

    /// Whether a terminal state counts as a successful analysis.
    ///
    /// Unknown and error codes classify as unsuccessful.
    pub fn is_successful(&self) -> bool {
        matches!(
            self,
            ScanState::FinishedRunning | ScanState::PendingSupport | ScanState::Ready
        )
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_codes_not_completed() {
        for code in [0, 1, 2, 11] {
            let state = ScanState::from_code(code);
            assert!(!state.is_completed(), "code {} should not be completed", code);
            assert!(!state.is_successful(), "code {} should not be successful", code);
        }
    }

    #[test]
    fn test_terminal_codes_completed() {
        for code in [3, 4, 5, 6, 7, 8, 9, 10, 12, 13] {
            let state = ScanState::from_code(code);
            assert!(state.is_completed(), "code {} should be completed", code);
        }
    }

    #[test]
    fn test_successful_only_for_clean_terminals() {
        for code in 0..=13 {
            let state = ScanState::from_code(code);
            let expected = matches!(code, 3 | 5 | 6);
            assert_eq!(
                state.is_successful(),
                expected,
                "code {} successful classification",
                code
            );
        }
    }

    #[test]
    fn test_unknown_code_fail_safe() {
        for code in [-1, 14, 99, i32::MAX] {
            let state = ScanState::from_code(code);
            assert_eq!(state, ScanState::Unknown(code));
            assert_eq!(state.name(), "Unknown");
            assert!(state.is_completed(), "unknown code must stop polling");
            assert!(!state.is_successful(), "unknown code must not report success");
        }
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ScanState::from_code(0).name(), "Pending");
        assert_eq!(ScanState::from_code(3).name(), "FinishedRunning");
        assert_eq!(ScanState::from_code(6).name(), "Ready");
        assert_eq!(ScanState::from_code(13).name(), "PossibleMissingConfiguration");
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(ScanState::Running.to_string(), "Running");
        assert_eq!(ScanState::Unknown(42).to_string(), "Unknown");
    }
}
