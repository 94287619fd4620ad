use std::path::PathBuf;

pub fn default_enabled() -> bool {
    true
}

pub fn default_service_name() -> String {
    "armon".to_string()
}

pub fn default_timezone() -> String {
    "America/Argentina/Buenos_Aires".to_string()
}

pub fn default_period_seconds() -> u64 {
    5
}

pub fn default_cutoff() -> String {
    "22:05:00".to_string()
}

pub fn default_bond() -> String {
    "AL30".to_string()
}

pub fn default_mep_bond() -> String {
    "AL30D".to_string()
}

pub fn default_ccl_bond() -> String {
    "AL30C".to_string()
}

pub fn default_official_code() -> String {
    "A3500".to_string()
}

pub fn default_quotes_path() -> PathBuf {
    PathBuf::from("data/quotes.json")
}

pub fn default_futures_source() -> String {
    "ROFEX".to_string()
}

pub fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

pub fn default_fx_file() -> String {
    "fx.json".to_string()
}

pub fn default_snapshot_file() -> String {
    "fx.snapshot.json".to_string()
}

pub fn default_futures_file() -> String {
    "futuros.json".to_string()
}

pub fn default_ingest_timeout() -> u64 {
    10
}

pub fn default_source_tag() -> String {
    "PY".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
