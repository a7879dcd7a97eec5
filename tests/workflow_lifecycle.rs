//! Workflow engine lifecycle tests
//!
//! Drives the submit/poll/cleanup workflow against the scripted mock
//! client and asserts on recorded calls and reported events.

use std::fs;
use std::time::Duration;

use scan_lane::{
    FixedDashboard, Job, JobOutcome, MemoryReporter, MockAnalysisClient, ScanInfo, ScanState,
    ScanWorkflow, WorkflowConfig, WorkflowError,
};

fn fast_config() -> WorkflowConfig {
    WorkflowConfig {
        poll_interval: Duration::ZERO,
        ..WorkflowConfig::default()
    }
}

// =============================================================================
// Submission
// =============================================================================

#[test]
fn test_empty_artifact_set_fails_before_any_client_call() {
    let client = MockAnalysisClient::new();
    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let result = workflow.submit(&[]);

    assert!(matches!(result, Err(WorkflowError::NoArtifacts)));
    assert!(client.submit_calls().is_empty(), "no submission may be attempted");
}

#[test]
fn test_submission_names_carry_batch_index() {
    let client = MockAnalysisClient::new();
    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    workflow
        .submit(&["a.irx".to_string(), "b.irx".to_string()])
        .unwrap();

    assert_eq!(
        client.submit_calls(),
        vec![
            ("a.irx".to_string(), "staticscan-0".to_string()),
            ("b.irx".to_string(), "staticscan-1".to_string()),
        ]
    );
}

#[test]
fn test_version_suffix_in_submission_names() {
    let client = MockAnalysisClient::new();
    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let config = WorkflowConfig {
        version: Some("4.2".to_string()),
        ..fast_config()
    };
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, config);

    workflow.submit(&["a.irx".to_string()]).unwrap();

    assert_eq!(client.submit_calls()[0].1, "staticscan-4.2-0");
}

#[test]
fn test_missing_transfer_marker_is_a_silent_gap() {
    let client = MockAnalysisClient::new();
    // a.irx's upload never finishes; b.irx gets an id
    client.set_transcript("a.irx", "uploading...\n42% transferred\norphan-id\n");
    client.set_transcript("b.irx", "100% transferred\nid-b\n");

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let jobs = workflow
        .submit(&["a.irx".to_string(), "b.irx".to_string()])
        .unwrap();

    // the batch is legitimately smaller than the artifact count
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0], Job::new("id-b", "b.irx"));
}

#[test]
fn test_blank_lines_after_marker_are_skipped() {
    let client = MockAnalysisClient::new();
    client.set_transcript("a.irx", "100% transferred\nid-1\n\nid-2\n");

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let jobs = workflow.submit(&["a.irx".to_string()]).unwrap();

    let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["id-1", "id-2"]);
}

#[test]
fn test_submission_reports_one_event_per_accepted_id() {
    let client = MockAnalysisClient::new();
    client.set_transcript("a.irx", "100% transferred\nid-1\nid-2\n");

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    workflow.submit(&["a.irx".to_string()]).unwrap();

    let messages = reporter.info_messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("a.irx"));
    assert!(messages[0].contains("staticscan-0"));
    assert!(messages[0].contains("id-1"));
    assert!(messages[1].contains("id-2"));
}

// =============================================================================
// Polling
// =============================================================================

#[test]
fn test_poll_to_completion_fetches_metrics_once() {
    let client = MockAnalysisClient::new();
    client.script_status("job-a", &[0, 2, 3]); // Pending, Running, FinishedRunning
    client.set_info(
        "job-a",
        ScanInfo {
            name: "my-scan".to_string(),
            ..ScanInfo::default()
        },
    );

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let outcomes = workflow.wait(&[Job::new("job-a", "a.irx")]);

    assert_eq!(client.status_calls().len(), 3);
    assert_eq!(client.info_call_count("job-a"), 1, "metrics fetched exactly once");

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(
        &outcomes[0],
        JobOutcome::Finished { state, info, .. }
            if *state == ScanState::FinishedRunning && info.name == "my-scan"
    ));

    let messages = reporter.info_messages();
    assert!(messages.iter().any(|m| m.contains("Pending")));
    assert!(messages.iter().any(|m| m.contains("Running")));
    assert!(messages.iter().any(|m| m.contains("FinishedRunning")));
    assert_eq!(
        messages.iter().filter(|m| m.contains("Analysis successful")).count(),
        1
    );
}

#[test]
fn test_unsuccessful_terminal_state_reports_failure() {
    let client = MockAnalysisClient::new();
    client.script_status("job-a", &[2, 8]); // Running, FailedToScan

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(Some("https://dash.example.com".to_string()));
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let outcomes = workflow.wait(&[Job::new("job-a", "a.irx")]);

    assert!(!outcomes[0].is_successful());
    assert!(reporter
        .info_messages()
        .iter()
        .any(|m| m.contains("Analysis unsuccessful")));
    assert!(
        reporter.highlights().is_empty(),
        "no dashboard block for a failed job"
    );
}

#[test]
fn test_dashboard_highlight_on_success() {
    let client = MockAnalysisClient::new();
    client.script_status("job-a", &[6]); // Ready

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(Some("https://dash.example.com".to_string()));
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    workflow.wait(&[Job::new("job-a", "a.irx")]);

    let highlights = reporter.highlights();
    assert_eq!(highlights.len(), 1);
    assert!(highlights[0]
        .iter()
        .any(|line| line.contains("https://dash.example.com")));
}

#[test]
fn test_no_highlight_without_dashboard() {
    let client = MockAnalysisClient::new();
    client.script_status("job-a", &[6]);

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    workflow.wait(&[Job::new("job-a", "a.irx")]);

    assert!(reporter.highlights().is_empty());
    assert!(reporter
        .info_messages()
        .iter()
        .any(|m| m.contains("Analysis successful")));
}

#[test]
fn test_invalid_job_id_does_not_sink_the_batch() {
    let client = MockAnalysisClient::new();
    client.fail_status("job-x");
    client.script_status("job-y", &[0, 6]);

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let outcomes = workflow.wait(&[Job::new("job-x", "x.irx"), Job::new("job-y", "y.irx")]);

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(&outcomes[0], JobOutcome::Unresolved { job } if job.id == "job-x"));
    assert!(outcomes[1].is_successful(), "job-y still polled to completion");
    assert_eq!(client.info_call_count("job-x"), 0);
    assert_eq!(client.info_call_count("job-y"), 1);
}

#[test]
fn test_unknown_state_code_stops_polling_without_success() {
    let client = MockAnalysisClient::new();
    client.script_status("job-a", &[2, 99]);

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let outcomes = workflow.wait(&[Job::new("job-a", "a.irx")]);

    assert!(matches!(
        &outcomes[0],
        JobOutcome::Finished { state, .. } if *state == ScanState::Unknown(99)
    ));
    assert!(!outcomes[0].is_successful());
    assert_eq!(client.status_calls().len(), 2, "polling stopped at the unknown code");
}

#[test]
fn test_resumed_jobs_poll_like_submitted_ones() {
    let client = MockAnalysisClient::new();
    client.script_status("outstanding-1", &[6]);

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let outcomes = workflow.wait(&[Job::resumed("outstanding-1")]);

    assert!(outcomes[0].is_successful());
}

// =============================================================================
// Cleanup
// =============================================================================

#[test]
fn test_cleanup_cancels_every_job_and_deletes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let artifact_a = dir.path().join("a.irx");
    let artifact_b = dir.path().join("b.irx");
    fs::write(&artifact_a, b"a").unwrap();
    fs::write(dir.path().join("a.irx.log"), b"log").unwrap();
    // b.irx and b.irx.log never existed

    let client = MockAnalysisClient::new();
    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    let jobs = vec![Job::new("job-a", "a.irx"), Job::new("job-b", "b.irx")];
    let artifacts = vec![
        artifact_a.to_string_lossy().into_owned(),
        artifact_b.to_string_lossy().into_owned(),
    ];

    workflow.cleanup(&jobs, &artifacts);

    assert_eq!(client.cancel_calls(), vec!["job-a", "job-b"]);
    assert!(!artifact_a.exists(), "artifact deleted");
    assert!(!dir.path().join("a.irx.log").exists(), "companion log deleted");
}

#[test]
fn test_cleanup_swallows_cancel_failures() {
    let client = MockAnalysisClient::new();
    client.fail_cancel();

    let reporter = MemoryReporter::new();
    let dashboard = FixedDashboard(None);
    let workflow = ScanWorkflow::new(&client, &reporter, &dashboard, fast_config());

    // must not panic or surface the failure
    workflow.cleanup(&[Job::new("job-a", "a.irx")], &[]);

    assert_eq!(client.cancel_calls(), vec!["job-a"]);
}
