//! Shared types for Market Data

use crate::change::{change, Change};
use chrono::NaiveDate;
use common::{finite, round2, safe_div};
use serde::{Deserialize, Serialize};

/// One instrument observation as delivered by a quote feed.
///
/// Feeds disagree on column names, so `ticker` is accepted for `symbol`
/// and `last` for the closing price `c`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteRow {
    #[serde(alias = "ticker")]
    pub symbol: String,
    /// Last traded price
    #[serde(rename = "c", alias = "last", default)]
    pub price: Option<f64>,
    /// Percent change vs. the prior session (e.g. `2.0` = +2%)
    #[serde(default)]
    pub pct_change: Option<f64>,
    /// Prior session close, used when `pct_change` is absent
    #[serde(default)]
    pub previous_price: Option<f64>,
    /// Number of operations
    #[serde(rename = "q_op", default)]
    pub operations: Option<f64>,
    /// Traded volume
    #[serde(rename = "v", default)]
    pub volume: Option<f64>,
}

impl QuoteRow {
    pub fn new(symbol: impl Into<String>, price: Option<f64>, pct_change: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            pct_change,
            ..Default::default()
        }
    }

    /// Percent change, falling back to one derived from `previous_price`
    pub fn effective_pct_change(&self) -> Option<f64> {
        if let Some(pct) = finite(self.pct_change) {
            return Some(pct);
        }
        let ratio = safe_div(self.price, self.previous_price)?;
        round2((ratio - 1.0) * 100.0)
    }
}

/// One published rate series: current value, reference value and the change
/// between them.
///
/// `chg` and `chg_pct` are always derived from `value` and `prev`; construct
/// through [`DerivedRate::new`] to keep them consistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRate {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub prev: Option<f64>,
    #[serde(default)]
    pub chg: Option<f64>,
    #[serde(default)]
    pub chg_pct: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl DerivedRate {
    pub fn new(value: Option<f64>, prev: Option<f64>, date: Option<NaiveDate>) -> Self {
        let value = finite(value);
        let prev = finite(prev);
        let Change { delta, delta_pct } = change(value, prev);
        Self {
            value,
            prev,
            chg: delta,
            chg_pct: delta_pct,
            date,
        }
    }

    /// Replace a missing `prev` with `fallback`, recomputing the change
    pub fn or_prev(self, fallback: Option<f64>) -> Self {
        if self.prev.is_some() {
            return self;
        }
        Self::new(self.value, fallback, self.date)
    }
}

/// Latest observation of a reference series (e.g. the official A3500 rate)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Last observation with a different value, if any
    pub prev: Option<f64>,
}

/// Current and previous-session value of one FX rate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatePair {
    pub now: Option<f64>,
    pub prev: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_row_aliases() {
        let row: QuoteRow =
            serde_json::from_str(r#"{"ticker":"AL30","last":1000.0,"pct_change":2.0}"#).unwrap();
        assert_eq!(row.symbol, "AL30");
        assert_eq!(row.price, Some(1000.0));
        assert_eq!(row.pct_change, Some(2.0));

        let row: QuoteRow =
            serde_json::from_str(r#"{"symbol":"AL30D","c":980.0,"q_op":12,"v":1500.5}"#).unwrap();
        assert_eq!(row.price, Some(980.0));
        assert_eq!(row.operations, Some(12.0));
        assert_eq!(row.volume, Some(1500.5));
        assert_eq!(row.pct_change, None);
    }

    #[test]
    fn test_effective_pct_change_from_previous_price() {
        let mut row = QuoteRow::new("AL30", Some(1020.0), None);
        row.previous_price = Some(1000.0);
        assert_eq!(row.effective_pct_change(), Some(2.0));

        row.previous_price = Some(0.0);
        assert_eq!(row.effective_pct_change(), None);

        row.pct_change = Some(-1.5);
        assert_eq!(row.effective_pct_change(), Some(-1.5));
    }

    #[test]
    fn test_derived_rate_consistency() {
        let rate = DerivedRate::new(Some(1020.0), Some(1000.0), None);
        assert_eq!(rate.chg, Some(20.0));
        assert_eq!(rate.chg_pct, Some(2.0));

        let rate = DerivedRate::new(Some(1020.0), None, None);
        assert_eq!(rate.chg, None);
        assert_eq!(rate.chg_pct, None);

        let rate = rate.or_prev(Some(1000.0));
        assert_eq!(rate.prev, Some(1000.0));
        assert_eq!(rate.chg, Some(20.0));
    }

    #[test]
    fn test_derived_rate_drops_nan() {
        let rate = DerivedRate::new(Some(f64::NAN), Some(1000.0), None);
        assert_eq!(rate.value, None);
        assert_eq!(rate.chg, None);
    }
}
