//! Trading calendar: weekends plus a list of market holidays.

use crate::error::MarketDataError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Upper bound on how far [`HolidayCalendar::market_date`] walks back
const MAX_LOOKBACK_DAYS: usize = 366;

/// Set of non-trading dates on top of Saturday/Sunday.
///
/// An empty calendar is valid and degrades every check to weekend-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: dates.into_iter().collect(),
        }
    }

    /// Parse a holiday list: one date per line, first column of a
    /// comma/semicolon separated row. Blank lines, `#` comments and cells
    /// that are not dates (headers, notes) are skipped.
    pub fn parse_list(text: &str) -> Self {
        let dates = text.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let cell = line.split([',', ';', '\t']).next().unwrap_or_default();
            parse_date(cell.trim().trim_matches('"')).ok()
        });
        Self::from_dates(dates)
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    pub fn is_listed_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Weekend or listed holiday
    pub fn is_market_holiday(&self, date: NaiveDate) -> bool {
        is_weekend(date) || self.is_listed_holiday(date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.is_market_holiday(date)
    }

    /// Most recent trading day on or before `date`
    pub fn market_date(&self, date: NaiveDate) -> NaiveDate {
        let mut d = date;
        for _ in 0..MAX_LOOKBACK_DAYS {
            if self.is_business_day(d) {
                return d;
            }
            match d.pred_opt() {
                Some(prev) => d = prev,
                None => break,
            }
        }
        d
    }

    /// Last trading day of the given month
    pub fn last_business_day_of_month(&self, year: i32, month: u32) -> Option<NaiveDate> {
        let first_of_next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let month_end = first_of_next - Duration::days(1);
        let last = self.market_date(month_end);
        (last.month() == month).then_some(last)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`
pub fn parse_date(s: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|_| MarketDataError::InvalidDate(s.to_string()))
}
