//! MEP / CCL implied exchange rates from bond triplets.
//!
//! The same sovereign bond trades in pesos (`AL30`), in dollars settled
//! locally (`AL30D`, MEP) and in dollars settled abroad (`AL30C`, CCL).
//! Dividing the peso price by a dollar price yields the implied rate:
//!
//! ```text
//! MEP = AL30 / AL30D
//! CCL = AL30 / AL30C
//! ```
//!
//! The previous-session rate uses each leg's price reconstructed from its
//! percent change, or the feed's previous price when no percent change is
//! sent. A missing or broken leg only nulls the rates that use it.

use crate::error::MarketDataError;
use crate::quotes::QuoteTable;
use crate::types::{QuoteRow, RatePair};
use common::{finite, round2, safe_div, Symbol};
use tracing::debug;

/// The three instruments an FX derivation reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FxLegs {
    /// Peso-denominated bond
    pub bond: Symbol,
    /// Dollar (MEP) variant
    pub mep_bond: Symbol,
    /// Dollar cable (CCL) variant
    pub ccl_bond: Symbol,
}

impl FxLegs {
    pub fn new(bond: &str, mep_bond: &str, ccl_bond: &str) -> Result<Self, MarketDataError> {
        let parse = |raw: &str| {
            Symbol::parse(raw).map_err(|_| MarketDataError::InvalidSymbol(raw.to_string()))
        };
        Ok(Self {
            bond: parse(bond)?,
            mep_bond: parse(mep_bond)?,
            ccl_bond: parse(ccl_bond)?,
        })
    }

    /// Look up the legs in `table` and derive both rates
    pub fn derive(&self, table: &QuoteTable) -> FxRates {
        let bond = table.get(self.bond.as_str());
        let mep_bond = table.get(self.mep_bond.as_str());
        let ccl_bond = table.get(self.ccl_bond.as_str());

        debug!(
            bond = ?bond.and_then(|r| r.price),
            mep_bond = ?mep_bond.and_then(|r| r.price),
            ccl_bond = ?ccl_bond.and_then(|r| r.price),
            "FX legs"
        );

        derive_fx(bond, mep_bond, ccl_bond)
    }
}

/// MEP and CCL, each with current and previous-session value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FxRates {
    pub mep: RatePair,
    pub ccl: RatePair,
}

impl FxRates {
    pub fn is_empty(&self) -> bool {
        self.mep.now.is_none() && self.ccl.now.is_none()
    }
}

/// Previous-session price: `price / (1 + pct_change / 100)` when the feed
/// sends a percent change, else the feed's own `previous_price`.
pub fn previous_price(row: &QuoteRow) -> Option<f64> {
    match finite(row.pct_change) {
        Some(pct) => safe_div(row.price, Some(1.0 + pct / 100.0)),
        None => finite(row.previous_price).filter(|p| *p > 0.0),
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    safe_div(numerator, denominator).and_then(round2)
}

/// Derive MEP and CCL from the three legs. Never fails: any missing leg,
/// zero divisor or non-finite input yields `None` for the affected values.
pub fn derive_fx(
    bond: Option<&QuoteRow>,
    mep_bond: Option<&QuoteRow>,
    ccl_bond: Option<&QuoteRow>,
) -> FxRates {
    let now = |row: Option<&QuoteRow>| row.and_then(|r| finite(r.price));
    let prev = |row: Option<&QuoteRow>| row.and_then(previous_price);

    FxRates {
        mep: RatePair {
            now: ratio(now(bond), now(mep_bond)),
            prev: ratio(prev(bond), prev(mep_bond)),
        },
        ccl: RatePair {
            now: ratio(now(bond), now(ccl_bond)),
            prev: ratio(prev(bond), prev(ccl_bond)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str, price: Option<f64>, pct: Option<f64>) -> QuoteRow {
        QuoteRow::new(symbol, price, pct)
    }

    #[test]
    fn test_mep_scenario() {
        let bond = row("AL30", Some(1000.0), Some(2.0));
        let mep = row("AL30D", Some(980.0), Some(1.0));

        let rates = derive_fx(Some(&bond), Some(&mep), None);

        assert_eq!(rates.mep.now, Some(1.02));
        assert!((previous_price(&bond).unwrap() - 980.392).abs() < 0.001);
        assert!((previous_price(&mep).unwrap() - 970.297).abs() < 0.001);
        assert_eq!(rates.mep.prev, Some(1.01));
        assert_eq!(rates.ccl, RatePair::default());
    }

    #[test]
    fn test_previous_price_taken_from_feed() {
        let mut bond = row("AL30", Some(1_150_000.0), None);
        bond.previous_price = Some(1_130_000.0);
        let mut mep = row("AL30D", Some(1_000.0), None);
        mep.previous_price = Some(1_000.0);

        assert_eq!(previous_price(&bond), Some(1_130_000.0));
        let rates = derive_fx(Some(&bond), Some(&mep), None);
        assert_eq!(rates.mep.prev, Some(1130.0));
        assert_eq!(rates.mep.now, Some(1150.0));

        bond.previous_price = Some(0.0);
        assert_eq!(previous_price(&bond), None);
    }

    #[test]
    fn test_derive_from_table() {
        let table = QuoteTable::from_rows(vec![
            row("AL30", Some(1_150_000.0), Some(0.5)),
            row("AL30D", Some(860.0), Some(-0.2)),
            row("AL30C", Some(850.0), None),
        ]);

        let legs = FxLegs::new("AL30", "AL30D", "AL30C").unwrap();
        let rates = legs.derive(&table);

        assert_eq!(rates.mep.now, Some(1337.21));
        assert_eq!(rates.ccl.now, Some(1352.94));
        assert!(rates.mep.prev.is_some());
        // no percent change on the CCL leg: no previous CCL
        assert_eq!(rates.ccl.prev, None);
    }

    #[test]
    fn test_missing_leg_nulls_only_its_rate() {
        let bond = row("AL30", Some(1000.0), Some(1.0));
        let ccl = row("AL30C", Some(990.0), Some(1.0));

        let rates = derive_fx(Some(&bond), None, Some(&ccl));

        assert_eq!(rates.mep, RatePair::default());
        assert_eq!(rates.ccl.now, Some(1.01));
        assert!(!rates.is_empty());
    }

    #[test]
    fn test_division_hazards() {
        let bond = row("AL30", Some(1000.0), Some(2.0));
        let zero = row("AL30D", Some(0.0), Some(1.0));
        let nan = row("AL30C", Some(f64::NAN), Some(1.0));

        let rates = derive_fx(Some(&bond), Some(&zero), Some(&nan));
        assert_eq!(rates.mep.now, None);
        assert_eq!(rates.ccl.now, None);
        assert_eq!(rates.ccl.prev, None);
        assert!(rates.is_empty());

        // -100% would divide by zero when reconstructing
        let wiped = row("AL30D", Some(980.0), Some(-100.0));
        let rates = derive_fx(Some(&bond), Some(&wiped), None);
        assert_eq!(rates.mep.now, Some(1.02));
        assert_eq!(rates.mep.prev, None);
    }

    #[test]
    fn test_no_nan_leakage() {
        let bond = row("AL30", Some(f64::INFINITY), Some(f64::NAN));
        let mep = row("AL30D", Some(980.0), Some(1.0));

        let rates = derive_fx(Some(&bond), Some(&mep), None);
        assert_eq!(rates.mep.now, None);
        assert_eq!(rates.mep.prev, None);
    }

    #[test]
    fn test_invalid_legs() {
        assert!(FxLegs::new("AL30", "AL30D", "AL30C").is_ok());
        assert_eq!(
            FxLegs::new("AL30", "", "AL30C"),
            Err(MarketDataError::InvalidSymbol(String::new()))
        );
    }
}
