use clap::{Parser, Subcommand};
use observability::LogFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "armon")]
#[command(about = "Monitor AR - MEP/CCL rates, dollar futures curve and freeze gate")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Override the configured log format (pretty, json, compact)
    #[arg(long, global = true, env = "ARMON_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the feeds until interrupted
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config/armon.yaml", env = "ARMON_CONFIG")]
        config: PathBuf,

        /// Override the polling period in seconds
        #[arg(long)]
        period: Option<u64>,

        /// Override the Prometheus exporter port
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Run a single cycle now and print its report as JSON
    Once {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config/armon.yaml", env = "ARMON_CONFIG")]
        config: PathBuf,
    },

    /// Validate configuration without polling
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config/armon.yaml", env = "ARMON_CONFIG")]
        config: PathBuf,
    },

    /// Write a configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "armon.yaml")]
        output: PathBuf,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Run { .. } => "run",
            Commands::Once { .. } => "once",
            Commands::Validate { .. } => "validate",
            Commands::Init { .. } => "init",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
