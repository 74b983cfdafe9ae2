//! normative: command-line front end for the discrimination audit.
//!
//! Loads a CSV dataset and an audit configuration, runs the explicit,
//! implicit and indirect checkers, and prints the report as JSON.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Normative discrimination audit over tabular data
#[derive(Parser, Debug)]
#[command(name = "normative", version, about, long_about = None)]
struct Cli {
    /// CSV dataset to audit (first line is the header)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Audit configuration document (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report on a single line
    #[arg(long)]
    compact: bool,

    /// Exit with code 2 when the report contains any finding
    #[arg(long)]
    fail_on_findings: bool,

    /// Also write JSON logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Write a commented configuration template
    Init {
        /// Destination file
        #[arg(default_value = "normative.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the effective configuration after defaults, user config and environment
    Show {
        /// Audit configuration document (.toml or .json)
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // Human-readable layer for stderr; stdout carries the report
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let mut _guard = None;
    let json_layer = match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("normative.log"));
            std::fs::create_dir_all(&dir)?;
            let file_appender = tracing_appender::rolling::never(&dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            _guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    if let Some(command) = cli.command {
        commands::handle_command(command)?;
        return Ok(ExitCode::SUCCESS);
    }

    let (Some(data), Some(config)) = (cli.data, cli.config) else {
        anyhow::bail!("--data and --config are required to run an audit");
    };

    let args = commands::AuditArgs {
        data,
        config,
        output: cli.output,
        compact: cli.compact,
    };
    let report = commands::run_audit(&args)?;

    if cli.fail_on_findings && !report.is_clean() {
        tracing::warn!(findings = report.total_findings(), "Audit reported findings");
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
