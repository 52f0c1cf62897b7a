//! usersdb demo - runs the data-access walkthrough against MySQL or SQLite
//!
//! Configuration comes from `USERSDB_*` environment variables (see `config`).
//! The report goes to stdout; logs and SQL errors go to stderr.

mod config;
mod report;

use anyhow::{Context, Result};
use config::{AppConfig, OutputFormat, StoreKind};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use usersdb_core::application::walkthrough::{
    self, TransactionSummary, WalkthroughOptions, WalkthroughProgress,
};
use usersdb_core::port::{ConnectionProvider, Session};
use usersdb_core::AppError;
use usersdb_infra_mysql::MySqlConnectionProvider;
use usersdb_infra_sqlite::SqliteConnectionProvider;

const DEFAULT_LOG_FILTER: &str = "usersdb=info";

fn init_logging() {
    let log_format = std::env::var("USERSDB_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Print the operator line for a store failure and hand the error on
fn report_failure(at: &'static str, err: AppError) -> anyhow::Error {
    eprintln!("{}", report::store_error(at, &err));
    anyhow::Error::new(err).context(format!("{} failed", at))
}

/// Print whatever the walkthrough finished before it stopped
fn print_progress(
    progress: &WalkthroughProgress,
    config: &AppConfig,
    min_age: u32,
) -> Result<()> {
    match config.output {
        OutputFormat::Text => {
            let text = report::progress_text(progress, min_age);
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        OutputFormat::Json => {
            let json = report::progress_json(progress).context("Failed to serialize progress")?;
            println!("{}", json);
        }
    }
    Ok(())
}

async fn run_with<P: ConnectionProvider>(provider: &P, config: &AppConfig) -> Result<()> {
    let mut session = provider
        .connect(&config.connection)
        .await
        .map_err(|e| report_failure("connect", e))?;

    let mut options = WalkthroughOptions::new(config.connection.schema());
    options.simulate_conflict = config.simulate_conflict;

    let mut progress = WalkthroughProgress::default();
    let outcome = walkthrough::run_tracked(&mut session, &options, &mut progress).await;

    // Close on every path; a walkthrough failure takes precedence
    let closed = session.close().await;
    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            print_progress(&progress, config, options.min_age)?;
            return Err(report_failure(progress.pending_step(), e));
        }
    };
    closed.map_err(|e| report_failure("close", e))?;

    if let TransactionSummary::RolledBack { failures } = &report.transaction {
        warn!(errors = failures.len(), "Walkthrough transaction was rolled back");
        eprintln!("{}", report::failure_lines(failures));
    }

    match config.output {
        OutputFormat::Text => println!("{}", report::walkthrough_text(&report)),
        OutputFormat::Json => {
            let json = report::walkthrough_json(&report).context("Failed to serialize report")?;
            println!("{}", json);
        }
    }

    Ok(())
}

async fn run(config: &AppConfig) -> Result<()> {
    match config.store {
        StoreKind::MySql => run_with(&MySqlConnectionProvider::new(), config).await,
        StoreKind::Sqlite => run_with(&SqliteConnectionProvider::new(), config).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = usersdb_core::VERSION,
        store = ?config.store,
        connection = ?config.connection,
        simulate_conflict = config.simulate_conflict,
        "usersdb demo starting"
    );

    match run(&config).await {
        Ok(()) => {
            info!("usersdb demo finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "usersdb demo failed");
            ExitCode::FAILURE
        }
    }
}
