use chrono::NaiveDate;
use serde::Serialize;

/// One observation period (a day or an hour) of ride counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RideRecord {
    pub date: NaiveDate,
    pub season: u8,
    pub temperature: f64,
    pub casual: u64,
    pub registered: u64,
    pub count: u64,
}

impl RideRecord {
    /// `count` must equal `casual + registered`.
    pub fn is_consistent(&self) -> bool {
        self.casual.checked_add(self.registered) == Some(self.count)
    }
}

/// Rows in source order. Never mutated once built; filtering produces a new table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideTable {
    records: Vec<RideRecord>,
}

impl RideTable {
    pub fn new(records: Vec<RideRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RideRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest date in the table, `None` when empty.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(
            self.records
                .iter()
                .fold((first, first), |(min, max), r| (min.min(r.date), max.max(r.date))),
        )
    }

    pub fn total_count(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }

    pub fn headline_metrics(&self) -> HeadlineMetrics {
        HeadlineMetrics {
            total_registered: self.records.iter().map(|r| r.registered).sum(),
            total_casual: self.records.iter().map(|r| r.casual).sum(),
            total_count: self.total_count(),
        }
    }
}

impl FromIterator<RideRecord> for RideTable {
    fn from_iter<I: IntoIterator<Item = RideRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Totals over the whole unfiltered ride table, shown regardless of the date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadlineMetrics {
    pub total_registered: u64,
    pub total_casual: u64,
    pub total_count: u64,
}
