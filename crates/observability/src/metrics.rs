//! Prometheus metrics for the polling loop

use metrics::{counter, gauge, histogram, Counter, Gauge, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter; metrics are served at `/metrics` on `port`.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Cycle metrics for one monitor instance.
///
/// # Metrics
///
/// * `monitor_cycles_total{service, state}` - completed cycles by gate state
/// * `monitor_cycle_failures_total{service}` - cycles that returned an error
/// * `monitor_cycle_duration_seconds{service}` - wall time per cycle
/// * `monitor_frozen{service}` - 1 while the freeze gate is closed
#[derive(Clone)]
pub struct CycleMetrics {
    open_cycles: Counter,
    frozen_cycles: Counter,
    failures: Counter,
    duration: Histogram,
    frozen: Gauge,
    service: String,
}

impl CycleMetrics {
    pub fn new(service: &str) -> Self {
        let name = service.to_string();

        Self {
            open_cycles: counter!(
                "monitor_cycles_total",
                "service" => name.clone(),
                "state" => "open"
            ),
            frozen_cycles: counter!(
                "monitor_cycles_total",
                "service" => name.clone(),
                "state" => "frozen"
            ),
            failures: counter!("monitor_cycle_failures_total", "service" => name.clone()),
            duration: histogram!("monitor_cycle_duration_seconds", "service" => name.clone()),
            frozen: gauge!("monitor_frozen", "service" => name.clone()),
            service: name,
        }
    }

    /// Record a completed cycle
    pub fn record_cycle(&self, frozen: bool, duration: Duration) {
        if frozen {
            self.frozen_cycles.increment(1);
            self.frozen.set(1.0);
        } else {
            self.open_cycles.increment(1);
            self.frozen.set(0.0);
        }
        self.duration.record(duration.as_secs_f64());
    }

    /// Record a cycle that ended in an error
    pub fn record_failure(&self, duration: Duration) {
        self.failures.increment(1);
        self.duration.record(duration.as_secs_f64());
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}
