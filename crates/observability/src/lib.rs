//! Observability for Monitor AR
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics for polling cycles
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("armon", LogFormat::Json)?;
//!
//! // Optional exporter
//! observability::metrics::init_metrics(9100)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, CycleMetrics};
