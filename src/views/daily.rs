use crate::data::models::RideTable;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_count: u64,
}

/// One row per distinct date, ascending.
pub fn build_daily_totals(table: &RideTable) -> Vec<DailyTotal> {
    let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in table.records() {
        *totals.entry(record.date).or_insert(0) += record.count;
    }

    totals
        .into_iter()
        .map(|(date, total_count)| DailyTotal { date, total_count })
        .collect()
}
