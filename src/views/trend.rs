//! Weekday/weekend ride trend.

use crate::data::models::RideTable;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub total_count: u64,
}

/// Ride totals per (date, day type), ascending by date.
///
/// After grouping, each row is compared with the row that follows it in
/// sorted order. The last row is dropped, as is every row whose successor
/// falls in a different month number. This trims the trailing point of each
/// month so the chart does not jump into the next month's range.
pub fn build_weekday_trend(table: &RideTable) -> Vec<TrendPoint> {
    let mut totals: BTreeMap<(NaiveDate, DayType), u64> = BTreeMap::new();
    for record in table.records() {
        *totals
            .entry((record.date, DayType::of(record.date)))
            .or_insert(0) += record.count;
    }

    let grouped: Vec<TrendPoint> = totals
        .into_iter()
        .map(|((date, day_type), total_count)| TrendPoint {
            date,
            day_type,
            total_count,
        })
        .collect();

    // Compares month numbers only, so December followed by a later December is kept.
    grouped
        .windows(2)
        .filter(|pair| pair[0].date.month() == pair[1].date.month())
        .map(|pair| pair[0])
        .collect()
}
