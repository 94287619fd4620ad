//! Per-cycle quote lookup keyed by normalized symbol.

use crate::types::QuoteRow;
use common::Symbol;
use std::collections::BTreeMap;
use tracing::debug;

/// Symbol-indexed snapshot of instrument quotes for one polling cycle.
///
/// Symbols are normalized on the way in and on lookup, so `"al30 "` and
/// `"AL-30"` hit the same row. When a feed repeats a symbol the first row
/// wins.
#[derive(Debug, Clone, Default)]
pub struct QuoteTable {
    rows: BTreeMap<Symbol, QuoteRow>,
}

impl QuoteTable {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    pub fn from_rows(rows: impl IntoIterator<Item = QuoteRow>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert(row);
        }
        table
    }

    /// Insert a row unless its symbol is empty or already present.
    /// Returns whether the row was stored.
    pub fn insert(&mut self, mut row: QuoteRow) -> bool {
        let symbol = match Symbol::parse(&row.symbol) {
            Ok(s) => s,
            Err(_) => {
                debug!(raw = %row.symbol, "Skipping quote row without symbol");
                return false;
            }
        };
        if self.rows.contains_key(&symbol) {
            return false;
        }
        row.symbol = symbol.to_string();
        self.rows.insert(symbol, row);
        true
    }

    pub fn get(&self, symbol: &str) -> Option<&QuoteRow> {
        let symbol = Symbol::parse(symbol).ok()?;
        self.rows.get(&symbol)
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).and_then(|r| r.price)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    /// Rows in symbol order
    pub fn iter(&self) -> impl Iterator<Item = &QuoteRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
