use crate::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("Invalid time format '{time}': expected HH:MM:SS or HH:MM")]
    InvalidTimeFormat { time: String },

    #[error("FX symbol {field} is required")]
    MissingFxSymbol { field: String },

    #[error("FX legs must be distinct, '{symbol}' is used twice")]
    DuplicateFxSymbol { symbol: String },

    #[error("Output files {first} and {second} resolve to the same path")]
    OutputCollision { first: String, second: String },

    #[error("Invalid ingest URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Environment variable '{var}' is missing or invalid: {message}")]
    InvalidEnvVar { var: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

pub fn validate_config(config: &MonitorConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.monitor, &mut report);
    validate_freeze(&config.freeze, &config.calendar, &mut report);
    validate_fx(&config.fx, &config.sources, &mut report);
    validate_sources(&config.sources, &mut report);
    validate_output(&config.output, &mut report);
    validate_ingest(&config.ingest, &mut report);
    validate_logging(&config.logging, &mut report);

    report
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.timezone.parse::<chrono_tz::Tz>().is_err() {
        report.add_error(ValidationError::InvalidTimezone(service.timezone.clone()));
    }

    if service.period_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "monitor.period_seconds".to_string(),
        });
    }

    if service.name.trim().is_empty() {
        report.add_warning("monitor.name", "Empty service name, logs will be unlabelled");
    }
}

fn validate_freeze(
    freeze: &FreezeConfig,
    calendar: &CalendarConfig,
    report: &mut ValidationReport,
) {
    match freeze.cutoff_time() {
        None => report.add_error(ValidationError::InvalidTimeFormat {
            time: freeze.cutoff.clone(),
        }),
        Some(time) if freeze.cutoff.trim().matches(':').count() != 2 => {
            report.add_default("freeze.cutoff", &time.format("%H:%M:%S").to_string());
        }
        Some(_) => {}
    }

    if calendar.holidays_path.is_none() {
        report.add_warning(
            "calendar.holidays_path",
            "No holiday list configured, only weekends will freeze",
        );
    }
}

fn validate_fx(fx: &FxConfig, sources: &SourcesConfig, report: &mut ValidationReport) {
    let legs = [
        ("fx.bond", &fx.bond),
        ("fx.mep_bond", &fx.mep_bond),
        ("fx.ccl_bond", &fx.ccl_bond),
    ];

    let mut seen: Vec<String> = Vec::new();
    for (field, symbol) in legs {
        let normalized = common::normalize_symbol(symbol);
        if normalized.is_empty() {
            report.add_error(ValidationError::MissingFxSymbol {
                field: field.to_string(),
            });
            continue;
        }
        if seen.contains(&normalized) {
            report.add_error(ValidationError::DuplicateFxSymbol { symbol: normalized });
        } else {
            seen.push(normalized);
        }
    }

    if fx.official_code.trim().is_empty() {
        report.add_warning("fx.official_code", "No official reference series tracked");
    } else if sources.reference_path(&fx.official_code).is_none() {
        report.add_warning(
            "sources.reference_paths",
            &format!("No series file for official code '{}'", fx.official_code),
        );
    }
}

fn validate_sources(sources: &SourcesConfig, report: &mut ValidationReport) {
    if sources.futures_path.is_none() {
        report.add_warning("sources.futures_path", "No futures source, curve will not be built");
    }

    let paths = std::iter::once(sources.quotes_path.to_string_lossy().into_owned())
        .chain(sources.futures_path.iter().map(|p| p.to_string_lossy().into_owned()))
        .chain(sources.reference_paths.values().map(|p| p.to_string_lossy().into_owned()));
    for path in paths {
        if let Some(var) = unresolved_env_vars(&path).into_iter().next() {
            report.add_error(ValidationError::InvalidEnvVar {
                var,
                message: format!("unresolved in source path '{}'", path),
            });
        }
    }
}

fn validate_output(output: &OutputConfig, report: &mut ValidationReport) {
    let files = [
        ("output.fx_file", output.fx_path()),
        ("output.snapshot_file", output.snapshot_path()),
        ("output.futures_file", output.futures_path()),
    ];

    for (i, (first, a)) in files.iter().enumerate() {
        for (second, b) in files.iter().skip(i + 1) {
            if a == b {
                report.add_error(ValidationError::OutputCollision {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }
}

fn validate_ingest(ingest: &IngestConfig, report: &mut ValidationReport) {
    if let Some(url) = &ingest.url {
        if let Some(var) = unresolved_env_vars(url).into_iter().next() {
            report.add_error(ValidationError::InvalidEnvVar {
                var,
                message: "unresolved in ingest.url".to_string(),
            });
        } else if let Err(e) = url::Url::parse(url) {
            report.add_error(ValidationError::InvalidUrl {
                url: url.clone(),
                message: e.to_string(),
            });
        }
    }

    if ingest.timeout_seconds == 0 {
        report.add_default("ingest.timeout_seconds", &default_ingest_timeout().to_string());
    }

    if ingest.source_tag.trim().is_empty() {
        report.add_warning("ingest.source_tag", "Rows will be pushed without a source tag");
    }

    if !ingest.is_enabled() {
        report.add_warning("ingest", "No ingest url or rows_path, price rows are not published");
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if !LOG_FORMATS.contains(&logging.format.as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let report = validate_config(&MonitorConfig::default());

        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.field == "calendar.holidays_path"));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = MonitorConfig::default();
        config.monitor.timezone = "Mars/Olympus".to_string();
        config.monitor.period_seconds = 0;
        config.freeze.cutoff = "25:99".to_string();
        config.fx.mep_bond = " ".to_string();
        config.logging.format = "xml".to_string();

        let report = validate_config(&config);

        assert!(!report.is_valid());
        assert!(report
            .errors
            .contains(&ValidationError::InvalidTimezone("Mars/Olympus".to_string())));
        assert!(report.errors.contains(&ValidationError::InvalidPositiveInteger {
            field: "monitor.period_seconds".to_string()
        }));
        assert!(report.errors.contains(&ValidationError::InvalidTimeFormat {
            time: "25:99".to_string()
        }));
        assert!(report.errors.contains(&ValidationError::MissingFxSymbol {
            field: "fx.mep_bond".to_string()
        }));
        assert!(report
            .errors
            .contains(&ValidationError::InvalidLogFormat("xml".to_string())));
    }

    #[test]
    fn test_duplicate_legs_and_outputs() {
        let mut config = MonitorConfig::default();
        config.fx.ccl_bond = "al30-d".to_string();
        config.output.snapshot_file = config.output.fx_file.clone();

        let report = validate_config(&config);

        assert!(report.errors.contains(&ValidationError::DuplicateFxSymbol {
            symbol: "AL30D".to_string()
        }));
        assert!(report.errors.contains(&ValidationError::OutputCollision {
            first: "output.fx_file".to_string(),
            second: "output.snapshot_file".to_string()
        }));
    }

    #[test]
    fn test_ingest_checks() {
        let mut config = MonitorConfig::default();
        config.ingest.url = Some("${ARMON_TEST_UNSET_INGEST}".to_string());
        config.ingest.timeout_seconds = 0;

        let report = validate_config(&config);
        assert!(matches!(
            &report.errors[..],
            [ValidationError::InvalidEnvVar { var, .. }] if var == "ARMON_TEST_UNSET_INGEST"
        ));
        assert!(report
            .defaults_applied
            .iter()
            .any(|d| d.field == "ingest.timeout_seconds" && d.value == "10"));

        config.ingest.url = Some("not a url".to_string());
        let report = validate_config(&config);
        assert!(matches!(&report.errors[..], [ValidationError::InvalidUrl { .. }]));
    }

    #[test]
    fn test_short_cutoff_normalized() {
        let mut config = MonitorConfig::default();
        config.freeze.cutoff = "17:30".to_string();

        let report = validate_config(&config);

        assert!(report.is_valid());
        assert!(report
            .defaults_applied
            .iter()
            .any(|d| d.field == "freeze.cutoff" && d.value == "17:30:00"));
    }
}
