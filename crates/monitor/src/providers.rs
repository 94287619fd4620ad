//! Upstream collaborators: quote feed, reference series and futures board.
//!
//! The engine only sees the traits. The JSON-file implementations read the
//! files the scrapers drop on disk each cycle.

use crate::error::MonitorError;
use crate::Result;
use market_data::{FuturesQuote, Observation, QuoteRow, QuoteTable};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Trait for providing the instrument quote snapshot of one cycle.
#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quotes(&self) -> Result<QuoteTable>;
}

/// Trait for providing dated observations of a reference series.
#[async_trait::async_trait]
pub trait ReferenceRateProvider: Send + Sync {
    async fn fetch_series(&self, code: &str) -> Result<Vec<Observation>>;
}

/// Trait for providing dollar futures quotes.
#[async_trait::async_trait]
pub trait FuturesProvider: Send + Sync {
    async fn fetch_futures(&self) -> Result<Vec<FuturesQuote>>;
}

/// A feed file holds either a bare array or an object wrapping it
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "futuros", alias = "quotes", alias = "rows")]
        data: Vec<T>,
    },
}

impl<T> Listing<T> {
    fn into_rows(self) -> Vec<T> {
        match self {
            Listing::Bare(rows) | Listing::Wrapped { data: rows } => rows,
        }
    }
}

async fn read_listing<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let source_name = path.display().to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| MonitorError::provider(&source_name, e))?;
    let listing: Listing<T> =
        serde_json::from_slice(&bytes).map_err(|e| MonitorError::provider(&source_name, e))?;
    let rows = listing.into_rows();
    debug!(source = %source_name, rows = rows.len(), "Feed file read");
    Ok(rows)
}

/// Quotes from a JSON file of [`QuoteRow`]s
#[derive(Debug, Clone)]
pub struct JsonQuoteFile {
    path: PathBuf,
}

impl JsonQuoteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl QuoteProvider for JsonQuoteFile {
    async fn fetch_quotes(&self) -> Result<QuoteTable> {
        let rows: Vec<QuoteRow> = read_listing(&self.path).await?;
        let table = QuoteTable::from_rows(rows);
        if table.is_empty() {
            return Err(MonitorError::provider(
                self.path.display().to_string(),
                "feed has no quotes",
            ));
        }
        Ok(table)
    }
}

/// Reference series, one JSON file per series code
#[derive(Debug, Clone, Default)]
pub struct JsonSeriesFiles {
    paths: BTreeMap<String, PathBuf>,
}

impl JsonSeriesFiles {
    pub fn new(paths: BTreeMap<String, PathBuf>) -> Self {
        Self { paths }
    }
}

#[async_trait::async_trait]
impl ReferenceRateProvider for JsonSeriesFiles {
    async fn fetch_series(&self, code: &str) -> Result<Vec<Observation>> {
        let path = self
            .paths
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(code))
            .map(|(_, p)| p)
            .ok_or_else(|| MonitorError::provider(code, "no series file configured"))?;
        read_listing(path).await
    }
}

/// Futures quotes from a JSON file of [`FuturesQuote`]s
#[derive(Debug, Clone)]
pub struct JsonFuturesFile {
    path: PathBuf,
}

impl JsonFuturesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl FuturesProvider for JsonFuturesFile {
    async fn fetch_futures(&self) -> Result<Vec<FuturesQuote>> {
        read_listing(&self.path).await
    }
}
