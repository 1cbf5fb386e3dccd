use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use sms_history_export::config::{AppConfig, Credentials};
use sms_history_export::logging::init_logging;
use sms_history_export::progress::ExportProgress;
use sms_history_export::utils::{default_window, parse_date_bound, Bound};
use sms_history_export::validation::InputValidator;
use sms_history_export::{DateWindow, ExportService, TwilioMessageRepo};

/// Export SMS history from Twilio to a CSV file
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Start of the window, inclusive (YYYY-MM-DD or RFC 3339). Defaults to June 1 of this year
    #[arg(short, long)]
    start: Option<String>,

    /// End of the window, exclusive (YYYY-MM-DD exports that whole day, or RFC 3339).
    /// Defaults to now
    #[arg(short, long)]
    end: Option<String>,

    /// Output CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Records requested per list call
    #[arg(short, long)]
    page_size: Option<usize>,

    /// Drop records already exported at a page boundary timestamp
    #[arg(long)]
    skip_seen_boundary: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Do not draw the progress spinner
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Credentials (and the optional .env file) are read before anything else
    let credentials = Credentials::from_env().context("Twilio credentials are not configured")?;

    // Load configuration
    let mut config = AppConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let _log_guard = init_logging(
        Some(config.get_log_level().as_str()),
        &config.logging.format,
        log_file.as_deref(),
    )?;

    InputValidator::validate_credentials(&credentials)?;

    let window = resolve_window(&cli)?;
    InputValidator::validate_export_window(&window, cli.start.is_some() || cli.end.is_some())?;
    InputValidator::validate_page_size(config.export.page_size)?;
    let output_path = config.output_path();
    InputValidator::validate_output_path(&output_path)?;
    debug!(?credentials, "Using account");

    let repository =
        TwilioMessageRepo::new(credentials, &config.twilio).context("Failed to build HTTP client")?;
    let service = ExportService::new(repository)
        .with_page_size(config.export.page_size)
        .with_policy(config.boundary_policy());

    let progress = if config.export.show_progress {
        ExportProgress::spinner()
    } else {
        ExportProgress::hidden()
    };

    info!("Starting export process...");
    let summary = service
        .export(window, &output_path, &progress)
        .await
        .with_context(|| format!("Export to {} failed", output_path.display()))?;

    print_summary(&summary.path, summary.count);
    Ok(())
}

/// Command-line flags win over configuration files and environment
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.export.output_path = output.to_string_lossy().into_owned();
    }
    if let Some(page_size) = cli.page_size {
        config.export.page_size = page_size;
    }
    if cli.skip_seen_boundary {
        config.export.skip_seen_boundary = true;
    }
    if cli.no_progress {
        config.export.show_progress = false;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
}

/// Default window with any bound given on the command line replaced
fn resolve_window(cli: &Cli) -> Result<DateWindow> {
    let now = Local::now();
    let mut window = default_window(&now)?;

    if let Some(start) = &cli.start {
        window.start = parse_date_bound(start, &Local, Bound::Start)?;
    }
    if let Some(end) = &cli.end {
        window.end = parse_date_bound(end, &Local, Bound::End)?;
    }

    debug!(
        start = %window.start,
        end = %window.end,
        now = %now.with_timezone(&Utc),
        "Resolved window"
    );
    Ok(window)
}

#[allow(clippy::print_stdout)]
fn print_summary(path: &std::path::Path, count: u64) {
    println!("Export complete. File saved as {}", path.display());
    println!("Total messages exported: {count}");
}
