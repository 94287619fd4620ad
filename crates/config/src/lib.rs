use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

// ==================================================================================
// ROOT
// ==================================================================================

/// Root of `armon.yaml`. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: ServiceConfig,
    #[serde(default)]
    pub freeze: FreezeConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub fx: FxConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

// ==================================================================================
// SERVICE / SCHEDULE
// ==================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// IANA zone used for the freeze gate and market dates
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_period_seconds")]
    pub period_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            timezone: default_timezone(),
            period_seconds: default_period_seconds(),
        }
    }
}

impl ServiceConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FreezeConfig {
    #[serde(default = "default_enabled")]
    pub after_cutoff: bool,
    /// Local time of day, `HH:MM:SS` or `HH:MM`
    #[serde(default = "default_cutoff")]
    pub cutoff: String,
}

impl Default for FreezeConfig {
    fn default() -> Self {
        Self {
            after_cutoff: default_enabled(),
            cutoff: default_cutoff(),
        }
    }
}

impl FreezeConfig {
    pub fn cutoff_time(&self) -> Option<chrono::NaiveTime> {
        let raw = self.cutoff.trim();
        chrono::NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| chrono::NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CalendarConfig {
    /// Holiday list; without it only weekends are non-trading days
    #[serde(default)]
    pub holidays_path: Option<PathBuf>,
}

// ==================================================================================
// DERIVATION INPUTS
// ==================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FxConfig {
    #[serde(default = "default_bond")]
    pub bond: String,
    #[serde(default = "default_mep_bond")]
    pub mep_bond: String,
    #[serde(default = "default_ccl_bond")]
    pub ccl_bond: String,
    /// Reference series tracked next to MEP/CCL
    #[serde(default = "default_official_code")]
    pub official_code: String,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            bond: default_bond(),
            mep_bond: default_mep_bond(),
            ccl_bond: default_ccl_bond(),
            official_code: default_official_code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_quotes_path")]
    pub quotes_path: PathBuf,
    #[serde(default)]
    pub futures_path: Option<PathBuf>,
    #[serde(default = "default_futures_source")]
    pub futures_source: String,
    /// Reference series files keyed by series code
    #[serde(default)]
    pub reference_paths: BTreeMap<String, PathBuf>,
    /// Ticker allow-list for ingest rows
    #[serde(default)]
    pub tickers_path: Option<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            quotes_path: default_quotes_path(),
            futures_path: None,
            futures_source: default_futures_source(),
            reference_paths: BTreeMap::new(),
            tickers_path: None,
        }
    }
}

impl SourcesConfig {
    /// Path for a reference code, matched case-insensitively
    pub fn reference_path(&self, code: &str) -> Option<&PathBuf> {
        self.reference_paths
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(code))
            .map(|(_, v)| v)
    }
}

// ==================================================================================
// OUTPUTS
// ==================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Current snapshot
    #[serde(default = "default_fx_file")]
    pub fx_file: String,
    /// Last-known-good snapshot
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
    #[serde(default = "default_futures_file")]
    pub futures_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            fx_file: default_fx_file(),
            snapshot_file: default_snapshot_file(),
            futures_file: default_futures_file(),
        }
    }
}

impl OutputConfig {
    pub fn fx_path(&self) -> PathBuf {
        self.dir.join(&self.fx_file)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(&self.snapshot_file)
    }

    pub fn futures_path(&self) -> PathBuf {
        self.dir.join(&self.futures_file)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Endpoint receiving price rows as a JSON array
    #[serde(default)]
    pub url: Option<String>,
    /// File receiving the same rows
    #[serde(default)]
    pub rows_path: Option<PathBuf>,
    #[serde(default = "default_ingest_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_source_tag")]
    pub source_tag: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            url: None,
            rows_path: None,
            timeout_seconds: default_ingest_timeout(),
            source_tag: default_source_tag(),
        }
    }
}

impl IngestConfig {
    /// Request timeout; zero falls back to the default
    pub fn timeout(&self) -> Duration {
        match self.timeout_seconds {
            0 => Duration::from_secs(default_ingest_timeout()),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some() || self.rows_path.is_some()
    }
}

// ==================================================================================
// OBSERVABILITY
// ==================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Prometheus exporter port; disabled when absent
    #[serde(default)]
    pub port: Option<u16>,
}
