//! The polling engine.
//!
//! `MonitorWorker` evaluates the freeze gate once per cycle and then either
//! carries the previous snapshot forward (FROZEN) or recomputes FX, the
//! futures curve and the ingest rows (OPEN). Cycles run strictly one after
//! another on a fixed interval.

use crate::cache::FileCache;
use crate::error::MonitorError;
use crate::providers::{
    FuturesProvider, JsonFuturesFile, JsonQuoteFile, JsonSeriesFiles, QuoteProvider,
    ReferenceRateProvider,
};
use crate::sink::{FileRowSink, HttpRowSink, RowSink};
use crate::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use config::MonitorConfig;
use market_data::snapshot::{CCL, MEP};
use market_data::{
    assemble_rates, build_price_rows, latest_point, parse_ticker_list, CurveBuilder,
    FreezeGate, FreezePolicy, FuturesCurve, FxLegs, GateState, HolidayCalendar,
    MarketSnapshot, QuoteTable, ReferencePoint,
};
use observability::CycleMetrics;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::{JsonFile, SnapshotStore};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Outcome of one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub gate: GateState,
    pub market_date: NaiveDate,
    /// A snapshot was committed to the current slot
    pub fx_written: bool,
    pub curve_written: bool,
    /// Rows delivered to at least one sink
    pub rows_pushed: usize,
}

/// Background worker that keeps the published market state up to date.
pub struct MonitorWorker {
    name: String,
    timezone: Tz,
    period: Duration,
    gate: FreezeGate,
    legs: FxLegs,
    official_code: Option<String>,
    futures_source: String,
    source_tag: String,
    quotes: Arc<dyn QuoteProvider>,
    reference: Option<Arc<dyn ReferenceRateProvider>>,
    futures: Option<Arc<dyn FuturesProvider>>,
    sinks: Vec<Arc<dyn RowSink>>,
    store: SnapshotStore,
    curve_file: JsonFile<FuturesCurve>,
    holidays: Mutex<FileCache<HolidayCalendar>>,
    tickers: Mutex<FileCache<BTreeSet<String>>>,
    metrics: CycleMetrics,
}

impl MonitorWorker {
    /// Wire a worker with the file-backed collaborators named in `config`.
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let timezone: Tz = config.monitor.timezone.parse().map_err(|e| {
            MonitorError::config(format!("timezone '{}': {}", config.monitor.timezone, e))
        })?;
        if config.monitor.period_seconds == 0 {
            return Err(MonitorError::config("monitor.period_seconds must be positive"));
        }
        let cutoff = config.freeze.cutoff_time().ok_or_else(|| {
            MonitorError::config(format!("freeze.cutoff '{}' is not a time", config.freeze.cutoff))
        })?;
        let legs = FxLegs::new(&config.fx.bond, &config.fx.mep_bond, &config.fx.ccl_bond)
            .map_err(|e| MonitorError::config(e.to_string()))?;

        let reference: Option<Arc<dyn ReferenceRateProvider>> =
            if config.sources.reference_paths.is_empty() {
                None
            } else {
                Some(Arc::new(JsonSeriesFiles::new(config.sources.reference_paths.clone())))
            };
        let futures: Option<Arc<dyn FuturesProvider>> = config
            .sources
            .futures_path
            .as_ref()
            .map(|path| Arc::new(JsonFuturesFile::new(path)) as Arc<dyn FuturesProvider>);

        let mut sinks: Vec<Arc<dyn RowSink>> = Vec::new();
        if let Some(raw) = &config.ingest.url {
            let url = Url::parse(raw)
                .map_err(|e| MonitorError::config(format!("ingest.url '{}': {}", raw, e)))?;
            sinks.push(Arc::new(HttpRowSink::new(url, config.ingest.timeout())?));
        }
        if let Some(path) = &config.ingest.rows_path {
            sinks.push(Arc::new(FileRowSink::new(path)));
        }

        Ok(Self {
            name: config.monitor.name.clone(),
            timezone,
            period: config.monitor.period(),
            gate: FreezeGate::new(FreezePolicy {
                freeze_after_cutoff: config.freeze.after_cutoff,
                cutoff,
            }),
            legs,
            official_code: Some(config.fx.official_code.trim().to_string())
                .filter(|code| !code.is_empty()),
            futures_source: config.sources.futures_source.clone(),
            source_tag: config.ingest.source_tag.clone(),
            quotes: Arc::new(JsonQuoteFile::new(&config.sources.quotes_path)),
            reference,
            futures,
            sinks,
            store: SnapshotStore::new(config.output.fx_path(), config.output.snapshot_path()),
            curve_file: JsonFile::new(config.output.futures_path()),
            holidays: Mutex::new(FileCache::new(
                config.calendar.holidays_path.clone(),
                HolidayCalendar::parse_list,
            )),
            tickers: Mutex::new(FileCache::new(
                config.sources.tickers_path.clone(),
                parse_ticker_list,
            )),
            metrics: CycleMetrics::new(&config.monitor.name),
        })
    }

    pub fn with_quote_provider(mut self, provider: Arc<dyn QuoteProvider>) -> Self {
        self.quotes = provider;
        self
    }

    pub fn with_reference_provider(mut self, provider: Arc<dyn ReferenceRateProvider>) -> Self {
        self.reference = Some(provider);
        self
    }

    pub fn with_futures_provider(mut self, provider: Arc<dyn FuturesProvider>) -> Self {
        self.futures = Some(provider);
        self
    }

    pub fn with_sinks(mut self, sinks: Vec<Arc<dyn RowSink>>) -> Self {
        self.sinks = sinks;
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Wall-clock time in the configured market timezone
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// Run cycles every period until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            service = %self.name,
            period_seconds = self.period.as_secs(),
            timezone = %self.timezone,
            "Starting monitor"
        );

        let mut timer = tokio::time::interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!(service = %self.name, "Monitor shutting down");
                    return;
                }
                _ = timer.tick() => {
                    // outcome is logged and recorded by run_once
                    let _ = self.run_once(self.now()).await;
                }
            }
        }
    }

    /// One cycle with logging and metrics
    pub async fn run_once(&self, now: DateTime<Tz>) -> Result<CycleReport> {
        let started = Instant::now();
        let result = self.run_cycle(now).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(report) => {
                self.metrics.record_cycle(report.gate.is_frozen(), elapsed);
                info!(
                    gate = %report.gate,
                    market_date = %report.market_date,
                    fx_written = report.fx_written,
                    curve_written = report.curve_written,
                    rows_pushed = report.rows_pushed,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Cycle complete"
                );
            }
            Err(e) => {
                self.metrics.record_failure(elapsed);
                error!(error = %e, "Cycle failed");
            }
        }
        result
    }

    /// Evaluate the gate at `now` and carry forward or recompute.
    #[instrument(skip(self), fields(service = %self.name))]
    pub async fn run_cycle(&self, now: DateTime<Tz>) -> Result<CycleReport> {
        let local = now.naive_local();
        let stamp = now.fixed_offset();
        let calendar = self.holidays.lock().await.refreshed().clone();

        let gate = self.gate.evaluate(local, &calendar);
        let market_date = calendar.market_date(local.date());
        debug!(%gate, %market_date, "Gate evaluated");

        if gate.is_frozen() {
            self.carry_forward(gate, market_date, stamp)
        } else {
            self.recompute(gate, market_date, local, stamp, &calendar).await
        }
    }

    fn carry_forward(
        &self,
        gate: GateState,
        market_date: NaiveDate,
        stamp: DateTime<FixedOffset>,
    ) -> Result<CycleReport> {
        let fx_written = match self.store.read_previous()? {
            Some(prior) => {
                let snapshot = MarketSnapshot::carried_forward(&prior, market_date, stamp);
                self.store.commit(&snapshot)?;
                true
            }
            None => {
                info!("No prior snapshot to carry forward");
                false
            }
        };

        Ok(CycleReport {
            gate,
            market_date,
            fx_written,
            curve_written: false,
            rows_pushed: 0,
        })
    }

    async fn recompute(
        &self,
        gate: GateState,
        market_date: NaiveDate,
        local: NaiveDateTime,
        stamp: DateTime<FixedOffset>,
        calendar: &HolidayCalendar,
    ) -> Result<CycleReport> {
        let last_good = self.store.read_last_good().unwrap_or_else(|e| {
            warn!(error = %e, "Last good snapshot unreadable, no fallback prev this cycle");
            None
        });

        let table = match self.quotes.fetch_quotes().await {
            Ok(table) => Some(table),
            Err(e) => {
                warn!(error = %e, "Quote feed unavailable, keeping previous snapshot");
                None
            }
        };

        let fx_result = match &table {
            Some(table) => self
                .publish_fx(table, market_date, stamp, last_good.as_ref())
                .await
                .map(|()| true),
            None => Ok(false),
        };

        let curve_written = match self.publish_curve(calendar, stamp).await {
            Ok(written) => written,
            Err(e) => {
                error!(error = %e, "Futures curve not written");
                false
            }
        };

        let rows_pushed = match &table {
            Some(table) => self.push_rows(table, local).await,
            None => 0,
        };

        Ok(CycleReport {
            gate,
            market_date,
            fx_written: fx_result?,
            curve_written,
            rows_pushed,
        })
    }

    async fn publish_fx(
        &self,
        table: &QuoteTable,
        market_date: NaiveDate,
        stamp: DateTime<FixedOffset>,
        last_good: Option<&MarketSnapshot>,
    ) -> Result<()> {
        let fx = self.legs.derive(table);
        let point = self.fetch_reference().await;
        let reference = self
            .official_code
            .as_deref()
            .map(|code| (code, point.as_ref()));

        let rates = assemble_rates(&fx, reference, market_date, last_good);
        let snapshot = MarketSnapshot::fresh(rates, market_date, stamp);
        self.store.commit(&snapshot)?;

        info!(
            mep = ?snapshot.rate(MEP).and_then(|r| r.value),
            ccl = ?snapshot.rate(CCL).and_then(|r| r.value),
            %market_date,
            "FX snapshot published"
        );
        Ok(())
    }

    async fn fetch_reference(&self) -> Option<ReferencePoint> {
        let (Some(code), Some(provider)) = (&self.official_code, &self.reference) else {
            return None;
        };
        match provider.fetch_series(code).await {
            Ok(series) => latest_point(&series),
            Err(e) => {
                warn!(code = %code, error = %e, "Reference series unavailable");
                None
            }
        }
    }

    async fn publish_curve(
        &self,
        calendar: &HolidayCalendar,
        stamp: DateTime<FixedOffset>,
    ) -> Result<bool> {
        let Some(provider) = &self.futures else {
            return Ok(false);
        };
        let quotes = match provider.fetch_futures().await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(error = %e, "Futures feed unavailable, publishing empty curve");
                Vec::new()
            }
        };

        let curve = if quotes.is_empty() {
            debug!("No futures quotes");
            FuturesCurve::empty(stamp, &self.futures_source)
        } else {
            CurveBuilder::new(calendar, &self.futures_source).build(&quotes, stamp)
        };
        self.curve_file.write(&curve)?;

        info!(
            spot = ?curve.spot(),
            spot_from = %curve.spot_from,
            contracts = curve.contract_count(),
            "Futures curve published"
        );
        Ok(true)
    }

    async fn push_rows(&self, table: &QuoteTable, local: NaiveDateTime) -> usize {
        if self.sinks.is_empty() {
            return 0;
        }

        let allow = self.tickers.lock().await.refreshed().clone();
        let rows = build_price_rows(table, &allow, &self.source_tag, local);
        if rows.is_empty() {
            return 0;
        }

        let mut delivered = false;
        for sink in &self.sinks {
            match sink.push(&rows).await {
                Ok(()) => {
                    delivered = true;
                    debug!(sink = sink.name(), rows = rows.len(), "Rows pushed");
                }
                Err(e) => warn!(sink = sink.name(), error = %e, "Row push failed"),
            }
        }

        if delivered {
            rows.len()
        } else {
            0
        }
    }
}
