//! Flat per-instrument rows pushed to the ingest endpoint.

use crate::quotes::QuoteTable;
use chrono::NaiveDateTime;
use common::{finite, normalize_symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub ticker: String,
    pub price: f64,
    pub pct_change: Option<f64>,
    /// Number of operations, whole count
    pub q_op: Option<i64>,
    pub v: Option<f64>,
    /// Source tag
    pub fuente: String,
    /// Local capture time, `HH:MM:SS`
    pub hora_input: String,
    /// Local capture date, `DD/MM/YYYY`
    pub fecha_input: String,
}

/// One row per priced quote, in symbol order.
///
/// An empty `allow` set means every ticker is kept; otherwise tickers are
/// compared after normalization.
pub fn build_price_rows(
    table: &QuoteTable,
    allow: &BTreeSet<String>,
    source_tag: &str,
    now: NaiveDateTime,
) -> Vec<PriceRow> {
    let allow: BTreeSet<String> = allow.iter().map(|t| normalize_symbol(t)).collect();
    let hora_input = now.format("%H:%M:%S").to_string();
    let fecha_input = now.format("%d/%m/%Y").to_string();

    table
        .iter()
        .filter(|q| allow.is_empty() || allow.contains(&q.symbol))
        .filter_map(|q| {
            Some(PriceRow {
                ticker: q.symbol.clone(),
                price: finite(q.price)?,
                pct_change: finite(q.effective_pct_change()),
                q_op: finite(q.operations).map(|n| n.round() as i64),
                v: finite(q.volume),
                fuente: source_tag.to_string(),
                hora_input: hora_input.clone(),
                fecha_input: fecha_input.clone(),
            })
        })
        .collect()
}

/// Parse a ticker allow-list: tickers separated by newlines, commas or
/// whitespace; `#` starts a comment.
pub fn parse_ticker_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(|line| line.split(|c: char| c == ',' || c == ';' || c.is_whitespace()))
        .map(normalize_symbol)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuoteRow;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 14)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap()
    }

    fn table() -> QuoteTable {
        let mut gd30 = QuoteRow::new("GD30", Some(1100.0), None);
        gd30.operations = Some(42.0);
        gd30.volume = Some(15000.0);
        QuoteTable::from_rows(vec![
            QuoteRow::new("AL30", Some(1000.0), Some(2.0)),
            gd30,
            QuoteRow::new("TX26", None, Some(1.0)),
        ])
    }

    #[test]
    fn test_rows_skip_unpriced() {
        let rows = build_price_rows(&table(), &BTreeSet::new(), "PY", now());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticker, "AL30");
        assert_eq!(rows[0].pct_change, Some(2.0));
        assert_eq!(rows[0].fuente, "PY");
        assert_eq!(rows[0].hora_input, "09:05:03");
        assert_eq!(rows[0].fecha_input, "14/08/2025");
        assert_eq!(rows[1].q_op, Some(42));
        assert_eq!(rows[1].v, Some(15000.0));
    }

    #[test]
    fn test_operations_serialize_as_integer() {
        let rows = build_price_rows(&table(), &BTreeSet::new(), "PY", now());
        let json = serde_json::to_value(&rows[1]).unwrap();

        assert_eq!(json["q_op"], serde_json::json!(42));
        assert!(json["q_op"].is_i64());
    }

    #[test]
    fn test_allow_list() {
        let allow: BTreeSet<String> = ["gd30".to_string(), "TX26".to_string()].into();

        let rows = build_price_rows(&table(), &allow, "PY", now());

        let tickers: Vec<_> = rows.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["GD30"]);
    }

    #[test]
    fn test_parse_ticker_list() {
        let tickers = parse_ticker_list("# bonds\nal30, gd30\nTX26 # cer\n\n  ggal;ypfd\n");

        let expected: BTreeSet<String> = ["AL30", "GD30", "TX26", "GGAL", "YPFD"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tickers, expected);
    }
}
