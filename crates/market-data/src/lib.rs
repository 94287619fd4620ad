//! Derived-rate computation for Monitor AR
//!
//! This crate turns raw quote snapshots into the published market state.
//!
//! # Core Components
//!
//! - [`fx`] - MEP/CCL implied rates from a bond triplet
//! - [`change`] - Delta and delta-percent between two scalars
//! - [`calendar`] - Weekend and holiday calendar, market date resolution
//! - [`freeze`] - OPEN/FROZEN gate evaluated every cycle
//! - [`futures`] - Implied spot and maturity curve from dollar futures
//! - [`reference`] - Dated reference series (official rate)
//! - [`snapshot`] - The persisted snapshot record and its assembly
//! - [`rows`] - Flat price rows for the ingest endpoint
//!
//! # Key Invariants
//!
//! - Nothing here performs I/O; persistence lives in `storage`
//! - Arithmetic never fails: missing inputs and division hazards give `None`
//! - No NaN or infinity reaches a published value
//! - While frozen, derived values are carried forward untouched

pub mod calendar;
pub mod change;
pub mod error;
pub mod freeze;
pub mod futures;
pub mod fx;
pub mod quotes;
pub mod reference;
pub mod rows;
pub mod snapshot;
pub mod types;

pub use calendar::HolidayCalendar;
pub use change::{change, Change};
pub use error::MarketDataError;
pub use freeze::{FreezeGate, FreezePolicy, FreezeReason, GateState};
pub use futures::{CurveBuilder, CurveRow, FuturesContract, FuturesCurve, FuturesQuote};
pub use fx::{FxLegs, FxRates};
pub use quotes::QuoteTable;
pub use reference::{latest_point, Observation};
pub use rows::{build_price_rows, parse_ticker_list, PriceRow};
pub use snapshot::{assemble_rates, MarketSnapshot};
pub use types::{DerivedRate, QuoteRow, RatePair, ReferencePoint};

pub type Result<T> = std::result::Result<T, MarketDataError>;
