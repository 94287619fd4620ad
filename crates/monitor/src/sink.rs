//! Destinations for the flat price rows.

use crate::error::MonitorError;
use crate::Result;
use market_data::PriceRow;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Trait for publishing one cycle's price rows.
#[async_trait::async_trait]
pub trait RowSink: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    async fn push(&self, rows: &[PriceRow]) -> Result<()>;
}

/// POSTs rows as a JSON array to an ingest endpoint
#[derive(Debug, Clone)]
pub struct HttpRowSink {
    client: reqwest::Client,
    url: Url,
}

impl HttpRowSink {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::sink("http", e))?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl RowSink for HttpRowSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn push(&self, rows: &[PriceRow]) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(rows)
            .send()
            .await
            .map_err(|e| MonitorError::sink(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::sink(
                self.name(),
                format!("{} returned {}", self.url, status),
            ));
        }

        debug!(url = %self.url, rows = rows.len(), %status, "Rows posted");
        Ok(())
    }
}

/// Replaces a JSON file with the latest rows
#[derive(Debug, Clone)]
pub struct FileRowSink {
    path: PathBuf,
}

impl FileRowSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl RowSink for FileRowSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn push(&self, rows: &[PriceRow]) -> Result<()> {
        storage::write_json_atomic(&self.path, rows)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn row(ticker: &str, price: f64) -> PriceRow {
        PriceRow {
            ticker: ticker.to_string(),
            price,
            pct_change: Some(1.5),
            q_op: None,
            v: None,
            fuente: "PY".to_string(),
            hora_input: "11:00:00".to_string(),
            fecha_input: "14/08/2025".to_string(),
        }
    }

    #[tokio::test]
    async fn test_file_sink_replaces_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let sink = FileRowSink::new(&path);

        sink.push(&[row("AL30", 1000.0), row("GD30", 1100.0)]).await.unwrap();
        sink.push(&[row("AL30", 1001.0)]).await.unwrap();

        let stored: Vec<PriceRow> = storage::read_json(&path).unwrap().unwrap();
        assert_eq!(stored, vec![row("AL30", 1001.0)]);
    }

    #[tokio::test]
    async fn test_http_sink_unreachable() {
        // reserve a port, then free it so nothing listens there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = Url::parse(&format!("http://127.0.0.1:{}/api/ingest", port)).unwrap();
        let sink = HttpRowSink::new(url, Duration::from_secs(2)).unwrap();

        assert_matches!(
            sink.push(&[row("AL30", 1000.0)]).await,
            Err(MonitorError::Sink { sink, .. }) if sink == "http"
        );
    }
}
