//! The persisted market snapshot and its assembly from freshly derived rates.

use crate::fx::FxRates;
use crate::types::{DerivedRate, RatePair, ReferencePoint};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MEP: &str = "mep";
pub const CCL: &str = "ccl";

/// Derived values of one cycle plus capture metadata.
///
/// Serialized flat: every rate appears as a top-level key next to
/// `_timestamp`, `frozen`, `market_date` and `last_update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(flatten)]
    pub rates: BTreeMap<String, DerivedRate>,
    /// When the rates were captured
    #[serde(rename = "_timestamp")]
    pub timestamp: DateTime<FixedOffset>,
    pub frozen: bool,
    /// Trading date the rates represent
    pub market_date: NaiveDate,
    /// When this record was written
    pub last_update: DateTime<FixedOffset>,
}

impl MarketSnapshot {
    pub fn fresh(
        rates: BTreeMap<String, DerivedRate>,
        market_date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            rates,
            timestamp: now,
            frozen: false,
            market_date,
            last_update: now,
        }
    }

    /// Re-publish `prior`'s rates untouched with frozen metadata
    pub fn carried_forward(
        prior: &MarketSnapshot,
        market_date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            rates: prior.rates.clone(),
            timestamp: prior.timestamp,
            frozen: true,
            market_date,
            last_update: now,
        }
    }

    pub fn rate(&self, name: &str) -> Option<&DerivedRate> {
        self.rates.get(name)
    }

    /// Reference `prev` for `name` on `market_date`: the stored `prev` when
    /// this snapshot is from the same trading date, else the stored `value`.
    pub fn fallback_prev(&self, name: &str, market_date: NaiveDate) -> Option<f64> {
        let rate = self.rate(name)?;
        if self.market_date == market_date {
            rate.prev
        } else {
            rate.value
        }
    }
}

/// Build the rate map for a fresh snapshot.
///
/// `reference` names the tracked reference series and its latest point, if
/// one was obtained. Missing primary `prev` values fall back to `last_good`
/// when given.
pub fn assemble_rates(
    fx: &FxRates,
    reference: Option<(&str, Option<&ReferencePoint>)>,
    market_date: NaiveDate,
    last_good: Option<&MarketSnapshot>,
) -> BTreeMap<String, DerivedRate> {
    let fallback = |name: &str| last_good.and_then(|s| s.fallback_prev(name, market_date));
    let fx_rate = |pair: &RatePair, name: &str| {
        DerivedRate::new(pair.now, pair.prev, Some(market_date)).or_prev(fallback(name))
    };

    let mut rates = BTreeMap::new();
    rates.insert(MEP.to_string(), fx_rate(&fx.mep, MEP));
    rates.insert(CCL.to_string(), fx_rate(&fx.ccl, CCL));

    if let Some((code, point)) = reference {
        let name = code.to_lowercase();
        let rate = match point {
            Some(p) => DerivedRate::new(Some(p.value), p.prev, Some(p.date)),
            None => DerivedRate::default(),
        };
        let rate = rate.or_prev(fallback(&name));
        rates.insert(name, rate);
    }
    rates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 8, d, h, 0, 0)
            .unwrap()
    }

    fn snapshot_with(name: &str, rate: DerivedRate, market_date: NaiveDate) -> MarketSnapshot {
        let mut rates = BTreeMap::new();
        rates.insert(name.to_string(), rate);
        MarketSnapshot::fresh(rates, market_date, at(14, 15))
    }

    #[test]
    fn test_carried_forward_keeps_rates() {
        let prior = snapshot_with(
            MEP,
            DerivedRate::new(Some(1020.0), Some(1000.0), Some(date(15))),
            date(15),
        );

        let frozen = MarketSnapshot::carried_forward(&prior, date(15), at(16, 11));

        assert_eq!(frozen.rates, prior.rates);
        assert_eq!(frozen.rate(MEP).unwrap().value, Some(1020.0));
        assert!(frozen.frozen);
        assert_eq!(frozen.market_date, date(15));
        assert_eq!(frozen.timestamp, prior.timestamp);
        assert_eq!(frozen.last_update, at(16, 11));
    }

    #[test]
    fn test_fallback_prev_by_market_date() {
        let prior =
            snapshot_with(MEP, DerivedRate::new(Some(1020.0), Some(1000.0), None), date(14));

        assert_eq!(prior.fallback_prev(MEP, date(14)), Some(1000.0));
        assert_eq!(prior.fallback_prev(MEP, date(15)), Some(1020.0));
        assert_eq!(prior.fallback_prev(CCL, date(15)), None);
    }

    #[test]
    fn test_assemble_rates() {
        let fx = FxRates {
            mep: RatePair {
                now: Some(1337.21),
                prev: Some(1330.0),
            },
            ccl: RatePair {
                now: Some(1352.94),
                prev: None,
            },
        };
        let point = ReferencePoint {
            date: date(14),
            value: 1310.5,
            prev: Some(1305.0),
        };
        let last_good =
            snapshot_with(CCL, DerivedRate::new(Some(1350.0), Some(1340.0), None), date(13));

        let rates = assemble_rates(
            &fx,
            Some(("A3500", Some(&point))),
            date(14),
            Some(&last_good),
        );

        let mep = &rates[MEP];
        assert_eq!(mep.prev, Some(1330.0));
        assert_eq!(mep.chg, Some(7.21));
        assert_eq!(mep.date, Some(date(14)));

        // previous session close from the last good snapshot
        let ccl = &rates[CCL];
        assert_eq!(ccl.prev, Some(1350.0));
        assert_eq!(ccl.chg, Some(2.94));

        let official = &rates["a3500"];
        assert_eq!(official.value, Some(1310.5));
        assert_eq!(official.prev, Some(1305.0));
        assert_eq!(official.date, Some(date(14)));
    }

    #[test]
    fn test_reference_unavailable() {
        let last_good = snapshot_with(
            "a3500",
            DerivedRate::new(Some(1305.0), Some(1300.0), Some(date(13))),
            date(13),
        );

        let rates = assemble_rates(
            &FxRates::default(),
            Some(("A3500", None)),
            date(14),
            Some(&last_good),
        );

        let official = &rates["a3500"];
        assert_eq!(official.value, None);
        assert_eq!(official.prev, Some(1305.0));
        assert_eq!(official.chg, None);
    }

    #[test]
    fn test_assemble_without_inputs() {
        let rates = assemble_rates(&FxRates::default(), None, date(14), None);

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[MEP].value, None);
        assert_eq!(rates[CCL].chg_pct, None);
    }

    #[test]
    fn test_json_layout() {
        let snap = snapshot_with(
            MEP,
            DerivedRate::new(Some(1020.0), Some(1000.0), Some(date(14))),
            date(14),
        );

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["mep"]["value"], 1020.0);
        assert_eq!(json["mep"]["chg_pct"], 2.0);
        assert_eq!(json["mep"]["date"], "2025-08-14");
        assert_eq!(json["frozen"], false);
        assert_eq!(json["market_date"], "2025-08-14");
        assert!(json.get("_timestamp").is_some());
        assert!(json.get("last_update").is_some());

        let back: MarketSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snap);
    }
}
