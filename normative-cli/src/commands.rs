//! CLI subcommand handlers.

use crate::Commands;
use anyhow::Context;
use normative_core::{AuditReport, Auditor, Dataset, config};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Inputs for a single audit run.
#[derive(Debug, Clone)]
pub struct AuditArgs {
    pub data: PathBuf,
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub compact: bool,
}

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init { path, force } => handle_init(&path, force),
        Commands::Show { config } => handle_show(&config),
    }
}

fn handle_init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        return Ok(());
    }
    std::fs::write(path, config::TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created configuration template at: {}", path.display());
    Ok(())
}

fn handle_show(path: &Path) -> anyhow::Result<()> {
    let config = config::load_config(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Load inputs, run the standard audit, and write the JSON report.
pub fn run_audit(args: &AuditArgs) -> anyhow::Result<AuditReport> {
    let config = config::load_config(&args.config)
        .with_context(|| format!("failed to load configuration {}", args.config.display()))?;
    let dataset = Dataset::from_csv_path(&args.data)
        .with_context(|| format!("failed to load dataset {}", args.data.display()))?;

    let run = Auditor::standard()
        .run_config(&dataset, &config)
        .context("audit failed")?;

    let rendered = render_report(&run.report, args.compact)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
        }
    }
    Ok(run.report)
}

/// Serialize the report as `{"Ve": [...], "Vi": [...], "Vd": [...]}`.
pub fn render_report(report: &AuditReport, compact: bool) -> anyhow::Result<String> {
    let rendered = if compact {
        serde_json::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };
    Ok(rendered)
}
