//! Scan Lane CLI
//!
//! Entry point for the `scan-lane` pipeline gate.

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use scan_lane::envfile::{set_env_variable, DEFAULT_ENV_FILE};
use scan_lane::workflow::ScanWorkflow;
use scan_lane::{
    AnalysisClient, AppscanCli, BatchSummary, CfCli, Config, ConsoleReporter, Job, Reporter,
    ShellRunner,
};

#[derive(Parser)]
#[command(name = "scan-lane")]
#[command(about = "Static analysis scan gate for Cloud Foundry pipelines", version)]
struct Cli {
    /// Only login to the analysis service; no submission or polling
    #[arg(long)]
    loginonly: bool,

    /// Poll currently outstanding jobs instead of preparing a new submission
    #[arg(long)]
    checkstate: bool,

    /// After polling completes, cancel all jobs and delete generated artifacts
    #[arg(long)]
    cleanup: bool,

    /// Path of the shell-sourceable credentials file
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Path of the machine-readable batch summary
    #[arg(long, default_value = "scan_summary.json")]
    summary_json: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();
    let reporter = ConsoleReporter::new(config.debug);

    if let Err(e) = run(&cli, &config, &reporter) {
        reporter.warn(&format!("Run failed: {}", e));
        process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config, reporter: &dyn Reporter) -> Result<(), Box<dyn Error>> {
    reporter.info("Getting credentials for Static Analysis service");
    let cf = CfCli::new(ShellRunner, reporter);
    let credentials = cf.resolve_credentials(config.setup_space)?;

    let dashboard = cf.find_service_dashboard();
    reporter.info(&format!(
        "Writing credentials to {}",
        cli.env_file.display()
    ));
    set_env_variable(&cli.env_file, "APPSCAN_USER_ID", &credentials.user_id)?;
    set_env_variable(&cli.env_file, "APPSCAN_PASSWORD", &credentials.password)?;
    if let Some(url) = &dashboard {
        set_env_variable(&cli.env_file, "APPSCAN_DASHBOARD", url)?;
    }

    reporter.info("Connecting to Static Analysis service");
    let client = AppscanCli::new(ShellRunner);
    client.login(&credentials.user_id, &credentials.password)?;

    if cli.loginonly {
        reporter.info("LoginOnly set, login complete, exiting");
        return Ok(());
    }

    let workflow = ScanWorkflow::new(&client, reporter, &cf, config.workflow());

    // artifacts stay empty under --checkstate; cleanup then only cancels
    let mut artifacts: Vec<String> = Vec::new();
    let jobs: Vec<Job> = if cli.checkstate {
        client.list()?.into_iter().map(Job::resumed).collect()
    } else {
        reporter.info("Scanning for code submission");
        artifacts = client.prepare()?;

        let mut message = String::from("Generated scans as file(s):");
        for artifact in &artifacts {
            message.push_str(&format!("\n\t{}", artifact));
        }
        reporter.info(&message);

        reporter.info("Submitting scans for analysis");
        let jobs = workflow.submit(&artifacts)?;
        reporter.info("Waiting for analysis to complete");
        jobs
    };

    let outcomes = workflow.wait(&jobs);

    let summary = BatchSummary::from_outcomes(&outcomes);
    summary.write_to_file(&cli.summary_json)?;

    if cli.cleanup {
        workflow.cleanup(&jobs, &artifacts);
    }

    Ok(())
}
