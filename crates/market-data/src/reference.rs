//! Dated reference series such as the official wholesale rate.

use crate::calendar::parse_date;
use crate::types::ReferencePoint;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One dated observation of a reference series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(alias = "fecha", deserialize_with = "flexible_date")]
    pub date: NaiveDate,
    #[serde(alias = "valor")]
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

fn flexible_date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    parse_date(raw.trim()).map_err(serde::de::Error::custom)
}

/// Latest observation plus the most recent earlier observation whose value
/// differs from it. Non-finite values are ignored; input order does not
/// matter. Returns `None` for an empty series.
pub fn latest_point(observations: &[Observation]) -> Option<ReferencePoint> {
    let mut series: Vec<&Observation> = observations
        .iter()
        .filter(|o| o.value.is_finite())
        .collect();
    series.sort_by_key(|o| o.date);

    let (latest, earlier) = series.split_last()?;
    let prev = earlier
        .iter()
        .rev()
        .find(|o| o.value != latest.value)
        .map(|o| o.value);

    Some(ReferencePoint {
        date: latest.date,
        value: latest.value,
        prev,
    })
}
