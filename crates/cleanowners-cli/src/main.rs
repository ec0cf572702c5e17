//! Cleanowners CLI
//!
//! A command-line tool that removes former organization members from
//! GitHub CODEOWNERS files through pull requests.

use clap::Parser;
use std::io::{self, IsTerminal};
use std::process::ExitCode as StdExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cleanowners_core::provider::ProviderError;
use cleanowners_core::{
    ReconcileError, Reconciler, RunStatistics, UuidBranchIds, collect_repositories,
};
use cli::Args;
use cli::config::{ExitCode, ValidatedConfig, create_octocrab};
use cli::github::OctocrabClient;
use cli::output::{HumanOutput, write_json, write_report_file};

#[tokio::main]
async fn main() -> StdExitCode {
    let args = Args::parse();

    init_tracing(args.verbose, args.json);

    // Set up signal handling for graceful shutdown
    let terminated = Arc::new(AtomicBool::new(false));
    let terminated_clone = terminated.clone();

    tokio::spawn(async move {
        let ctrl_c = signal::ctrl_c();
        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT, finishing the current repository...");
            }
            _ = terminate => {
                info!("Received SIGTERM, finishing the current repository...");
            }
        }

        terminated_clone.store(true, Ordering::SeqCst);
    });

    let exit_code = run(args, terminated.clone()).await;

    if exit_code == ExitCode::Success && terminated.load(Ordering::SeqCst) {
        return StdExitCode::from(ExitCode::Terminated as u8);
    }

    StdExitCode::from(i32::from(exit_code) as u8)
}

/// Initialize tracing based on verbosity level.
fn init_tracing(verbosity: u8, json_output: bool) {
    // Logs would interleave with the JSON document on stdout
    if json_output {
        return;
    }

    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for quiet in ["octocrab=warn", "hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = quiet.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Run a reconciliation pass with the given arguments.
async fn run(args: Args, terminated: Arc<AtomicBool>) -> ExitCode {
    let config = match ValidatedConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            let use_colors = !args.json && io::stderr().is_terminal();
            let _ = HumanOutput::new(io::stderr().lock(), use_colors).write_error(&e.to_string());
            return ExitCode::StartupFailure;
        }
    };

    let use_colors = !config.json_output && io::stdout().is_terminal();
    let report_error = |message: &str| {
        let use_colors = !config.json_output && io::stderr().is_terminal();
        let _ = HumanOutput::new(io::stderr().lock(), use_colors).write_error(message);
    };

    debug!("Validated configuration: {:?}", config);
    if config.reconcile.dry_run {
        info!("Dry run: no branches or pull requests will be created");
    }

    let client = match create_octocrab(&config).await {
        Ok(octocrab) => OctocrabClient::new(octocrab),
        Err(e) => {
            report_error(&e.to_string());
            return ExitCode::StartupFailure;
        }
    };

    let repos = match collect_repositories(&client, &config.selection).await {
        Ok(repos) => repos,
        Err(e) => {
            report_error(&e.to_string());
            return startup_exit_code(&e);
        }
    };

    let mut stats = RunStatistics::new();
    let mut reconciler = Reconciler::new(&client, &config.reconcile, UuidBranchIds::new())
        .with_stop_flag(terminated);
    let outcome = reconciler.reconcile_all(&repos, &mut stats).await;

    // The summary and report cover whatever completed before a fatal error
    let mut exit_code = match &outcome {
        Ok(results) => {
            info!("Reconciled {} of {} repositories", results.len(), repos.len());
            ExitCode::Success
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            report_error(&e.to_string());
            ExitCode::RunFailed
        }
    };

    let written = if config.json_output {
        write_json(&mut io::stdout().lock(), &stats)
    } else {
        HumanOutput::new(io::stdout().lock(), use_colors).write_summary(&stats)
    };
    if let Err(e) = written {
        error!("Failed to write summary: {}", e);
    }

    if let Err(e) = write_report_file(&config.report_path, &stats) {
        report_error(&format!(
            "failed to write report '{}': {}",
            config.report_path.display(),
            e
        ));
        if exit_code == ExitCode::Success {
            exit_code = ExitCode::RunFailed;
        }
    }

    exit_code
}

/// Exit code for a failure while enumerating repositories.
///
/// A missing organization or rejected credentials is a startup problem;
/// anything else is an unexpected provider fault.
fn startup_exit_code(error: &ReconcileError) -> ExitCode {
    match error {
        ReconcileError::OrganizationNotFound(_)
        | ReconcileError::Provider {
            source: ProviderError::Forbidden(_) | ProviderError::NotFound(_),
            ..
        } => ExitCode::StartupFailure,
        _ => ExitCode::RunFailed,
    }
}
