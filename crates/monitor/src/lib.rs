//! Monitor AR polling engine
//!
//! Wires the market-data computations to their collaborators and drives
//! them on a fixed interval.
//!
//! # Core Components
//!
//! - [`providers`] - Quote, reference series and futures feeds
//! - [`sink`] - Destinations for flat price rows
//! - [`cache`] - Holiday and ticker files reloaded on change
//! - [`worker`] - The cycle driver

pub mod cache;
pub mod error;
pub mod providers;
pub mod sink;
pub mod worker;

pub use cache::FileCache;
pub use error::MonitorError;
pub use providers::{
    FuturesProvider, JsonFuturesFile, JsonQuoteFile, JsonSeriesFiles, QuoteProvider,
    ReferenceRateProvider,
};
pub use sink::{FileRowSink, HttpRowSink, RowSink};
pub use worker::{CycleReport, MonitorWorker};

pub type Result<T> = std::result::Result<T, MonitorError>;
