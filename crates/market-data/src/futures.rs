//! Dollar futures curve: implied spot per contract and the published views.
//!
//! A futures price is spot compounded forward at the contract's implied
//! (effective annual) rate over the ACT/360 year fraction to maturity:
//!
//! ```text
//! F = S * (1 + r) ^ (days / 360)
//! ```
//!
//! Inverting it gives the spot each contract implies. The front-month
//! contract's implied spot is published as the curve's spot row.

use crate::calendar::{parse_date, HolidayCalendar};
use crate::error::MarketDataError;
use chrono::{DateTime, FixedOffset, NaiveDate};
use common::{finite, round2, safe_div};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Label of the synthetic first row of the curve view
pub const SPOT_LABEL: &str = "SPOT";

/// `spotFrom` value when no contract yields a spot
pub const NO_SPOT: &str = "N/A";

const DAY_COUNT_BASIS: f64 = 360.0;

const MONTH_CODES: [&str; 12] = [
    "ENE", "FEB", "MAR", "ABR", "MAY", "JUN", "JUL", "AGO", "SEP", "OCT", "NOV", "DIC",
];

/// One futures quote as scraped from the exchange board.
///
/// Numeric cells may come as JSON numbers or as Argentine-formatted text
/// (`"1.312,000"`, `"53,63"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuturesQuote {
    /// Maturity label, e.g. `AGO25`
    pub mes: String,
    /// Futures price
    #[serde(default, deserialize_with = "localized::number")]
    pub rofex: Option<f64>,
    /// Nominal annual rate, percent
    #[serde(default, deserialize_with = "localized::number")]
    pub tna: Option<f64>,
    /// Implied effective annual rate, percent
    #[serde(default, deserialize_with = "localized::number")]
    pub tir: Option<f64>,
    #[serde(default, deserialize_with = "localized::date")]
    pub vencimiento: Option<NaiveDate>,
    #[serde(default)]
    pub days_to_mat: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuturesContract {
    pub maturity_label: String,
    pub price: Option<f64>,
    /// Nominal annual rate, percent
    pub annual_rate_tna: Option<f64>,
    /// Implied effective annual rate, percent
    pub implied_rate: Option<f64>,
    pub maturity: Option<NaiveDate>,
    /// Calendar days from the as-of date; negative once expired
    pub days_to_maturity: Option<i64>,
    pub implied_spot: Option<f64>,
}

impl FuturesContract {
    fn is_spot_candidate(&self) -> bool {
        self.implied_spot.is_some() && self.days_to_maturity.is_some_and(|d| d >= 0)
    }

    fn to_row(&self, spot: Option<f64>) -> CurveRow {
        CurveRow {
            mes: self.maturity_label.clone(),
            rofex: self.price,
            tna: self.annual_rate_tna,
            tir: self.implied_rate,
            pase: safe_div(self.price, spot).and_then(|r| round2((r - 1.0) * 100.0)),
            vencimiento: self.maturity,
            days_to_mat: self.days_to_maturity,
            spot_est: self.implied_spot,
        }
    }
}

/// One row of the persisted curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRow {
    pub mes: String,
    pub rofex: Option<f64>,
    pub tna: Option<f64>,
    pub tir: Option<f64>,
    /// Premium over the published spot, percent
    pub pase: Option<f64>,
    pub vencimiento: Option<NaiveDate>,
    pub days_to_mat: Option<i64>,
    pub spot_est: Option<f64>,
}

impl CurveRow {
    fn spot(spot: Option<f64>) -> Self {
        Self {
            mes: SPOT_LABEL.to_string(),
            rofex: spot,
            tna: None,
            tir: None,
            pase: None,
            vencimiento: None,
            days_to_mat: None,
            spot_est: spot,
        }
    }
}

/// Persisted futures record: curve view (SPOT first, contracts in input
/// order) and maturity view (contracts only, by maturity then label).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesCurve {
    pub as_of: DateTime<FixedOffset>,
    pub source: String,
    pub spot_from: String,
    pub curva: Vec<CurveRow>,
    pub vencimientos: Vec<CurveRow>,
}

impl FuturesCurve {
    /// Curve with no contracts: a null spot row and nothing else
    pub fn empty(as_of: DateTime<FixedOffset>, source: impl Into<String>) -> Self {
        Self {
            as_of,
            source: source.into(),
            spot_from: NO_SPOT.to_string(),
            curva: vec![CurveRow::spot(None)],
            vencimientos: Vec::new(),
        }
    }

    pub fn spot(&self) -> Option<f64> {
        self.curva
            .first()
            .filter(|row| row.mes == SPOT_LABEL)
            .and_then(|row| row.rofex)
    }

    pub fn contract_count(&self) -> usize {
        self.vencimientos.len()
    }
}

/// `price / (1 + rate) ^ (max(days, 0) / 360)`, rounded to 2 decimals.
///
/// `rate` is a fraction (0.45 = 45%). Missing inputs, a rate at or below
/// -100%, or a non-finite result give `None`.
pub fn implied_spot(price: Option<f64>, rate: Option<f64>, days: Option<i64>) -> Option<f64> {
    let rate = finite(rate)?;
    let days = days?;
    if rate <= -1.0 {
        return None;
    }
    let years = days.max(0) as f64 / DAY_COUNT_BASIS;
    let factor = (1.0 + rate).powf(years);
    safe_div(price, Some(factor)).and_then(round2)
}

/// Resolve a label such as `AGO25`, `DLR/AGO25` or `ago 2025` to
/// `(year, month)`.
pub fn parse_maturity_label(label: &str) -> Result<(i32, u32), MarketDataError> {
    let err = || MarketDataError::InvalidMaturity(label.to_string());

    let clean: String = label
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let split = clean
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let (letters, digits) = clean.split_at(split);
    if letters.len() < 3 {
        return Err(err());
    }

    let code = &letters[letters.len() - 3..];
    let month = MONTH_CODES
        .iter()
        .position(|m| *m == code)
        .ok_or_else(err)? as u32
        + 1;
    let year = match digits.len() {
        2 => 2000 + digits.parse::<i32>().map_err(|_| err())?,
        4 => digits.parse::<i32>().map_err(|_| err())?,
        _ => return Err(err()),
    };
    Ok((year, month))
}

/// Front-month contract with an implied spot: smallest non-negative
/// days-to-maturity, first in input order on ties.
pub fn select_spot(contracts: &[FuturesContract]) -> Option<&FuturesContract> {
    contracts
        .iter()
        .filter(|c| c.is_spot_candidate())
        .min_by_key(|c| c.days_to_maturity)
}

fn maturity_order(a: &CurveRow, b: &CurveRow) -> Ordering {
    let by_date = match (a.vencimiento, b.vencimiento) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.mes.cmp(&b.mes))
}

/// Builds [`FuturesCurve`]s; maturities missing from the quotes are resolved
/// to the last trading day of the labelled month.
#[derive(Debug, Clone)]
pub struct CurveBuilder<'a> {
    calendar: &'a HolidayCalendar,
    source: String,
}

impl<'a> CurveBuilder<'a> {
    pub fn new(calendar: &'a HolidayCalendar, source: impl Into<String>) -> Self {
        Self {
            calendar,
            source: source.into(),
        }
    }

    pub fn contract(&self, quote: &FuturesQuote, as_of: NaiveDate) -> FuturesContract {
        let maturity = quote.vencimiento.or_else(|| {
            let (year, month) = parse_maturity_label(&quote.mes).ok()?;
            self.calendar.last_business_day_of_month(year, month)
        });
        let days_to_maturity = quote
            .days_to_mat
            .or_else(|| maturity.map(|m| (m - as_of).num_days()));
        let price = finite(quote.rofex);
        let implied_rate = finite(quote.tir);

        FuturesContract {
            maturity_label: quote.mes.trim().to_string(),
            price,
            annual_rate_tna: finite(quote.tna),
            implied_rate,
            maturity,
            days_to_maturity,
            implied_spot: implied_spot(price, implied_rate.map(|r| r / 100.0), days_to_maturity),
        }
    }

    pub fn build(&self, quotes: &[FuturesQuote], as_of: DateTime<FixedOffset>) -> FuturesCurve {
        let as_of_date = as_of.date_naive();
        let contracts: Vec<FuturesContract> =
            quotes.iter().map(|q| self.contract(q, as_of_date)).collect();

        let spot_ref = select_spot(&contracts);
        let spot = spot_ref.and_then(|c| c.implied_spot);
        let spot_from = spot_ref
            .map(|c| c.maturity_label.clone())
            .unwrap_or_else(|| NO_SPOT.to_string());

        debug!(
            contracts = contracts.len(),
            spot = ?spot,
            spot_from = %spot_from,
            "Futures curve built"
        );

        let rows: Vec<CurveRow> = contracts.iter().map(|c| c.to_row(spot)).collect();

        let mut curva = Vec::with_capacity(rows.len() + 1);
        curva.push(CurveRow::spot(spot));
        curva.extend(rows.iter().cloned());

        let mut vencimientos = rows;
        vencimientos.sort_by(maturity_order);

        FuturesCurve {
            as_of,
            source: self.source.clone(),
            spot_from,
            curva,
            vencimientos,
        }
    }
}

/// Deserializers for board cells that may be numbers or localized text
mod localized {
    use super::parse_date;
    use chrono::NaiveDate;
    use common::{finite, parse_ar_number};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f64),
        Text(String),
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Cell>::deserialize(d)? {
            Some(Cell::Number(x)) => finite(Some(x)),
            Some(Cell::Text(s)) => parse_ar_number(&s),
            None => None,
        })
    }

    pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.and_then(|s| parse_date(s.trim()).ok()))
    }
}
