//! Monitor AR CLI and polling binary
//!
//! Entry point for initializing, validating and running the monitor.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config, save_config, validate_config, MonitorConfig,
};
use monitor::MonitorWorker;
use observability::{init_logging, init_metrics, LogFormat};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Run {
            config,
            period,
            metrics_port,
        } => run_command(config, cli.log_format, period, metrics_port).await,
        Commands::Once { config } => once_command(config, cli.log_format).await,
        Commands::Validate { config } => {
            init_logging("armon", cli.log_format.unwrap_or_default())?;
            validate_command(config).await
        }
        Commands::Init { output } => {
            init_logging("armon", cli.log_format.unwrap_or_default())?;
            init_command(output).await
        }
    }
}

/// Load the file, start logging in the configured format and refuse to
/// continue on validation errors.
fn prepare(config_path: &Path, log_format: Option<LogFormat>) -> Result<MonitorConfig> {
    let config = load_config(config_path)?;

    let format = match log_format {
        Some(format) => format,
        None => LogFormat::parse(&config.logging.format).unwrap_or_default(),
    };
    init_logging(&config.monitor.name, format)?;
    info!(path = ?config_path, format = %format, "Configuration loaded");

    let report = validate_config(&config);
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start monitor due to configuration errors");
    }

    Ok(config)
}

async fn run_command<P: AsRef<Path>>(
    config_path: P,
    log_format: Option<LogFormat>,
    period_override: Option<u64>,
    metrics_port_override: Option<u16>,
) -> Result<()> {
    let mut config = prepare(config_path.as_ref(), log_format)?;

    if let Some(period) = period_override {
        anyhow::ensure!(period > 0, "--period must be positive");
        debug!(period, "Polling period overridden");
        config.monitor.period_seconds = period;
    }

    if let Some(port) = metrics_port_override.or(config.metrics.port) {
        init_metrics(port).context("Failed to start metrics exporter")?;
    }

    let worker = MonitorWorker::from_config(&config).context("Failed to build monitor")?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        signal.cancel();
    });

    worker.run(shutdown).await;
    info!("Monitor stopped");
    Ok(())
}

async fn once_command<P: AsRef<Path>>(config_path: P, log_format: Option<LogFormat>) -> Result<()> {
    let config = prepare(config_path.as_ref(), log_format)?;
    let worker = MonitorWorker::from_config(&config).context("Failed to build monitor")?;

    let report = worker.run_once(worker.now()).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Service: {}", config.monitor.name);
    println!("Timezone: {}", config.monitor.timezone);
    println!("Period: {}s", config.monitor.period_seconds);
    println!(
        "FX legs: {} / {} / {}",
        config.fx.bond, config.fx.mep_bond, config.fx.ccl_bond
    );
    println!("Output: {:?}", config.output.dir);
    println!(
        "Ingest: {}",
        if config.ingest.is_enabled() { "enabled" } else { "disabled" }
    );

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Point sources.quotes_path at the quote feed file");
    println!("  2. Set calendar.holidays_path to the holiday list");
    println!(
        "  3. Run 'armon validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  4. Run 'armon run --config {:?}' to start polling",
        output_path
    );

    Ok(())
}
