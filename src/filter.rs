use crate::data::models::RideTable;
use crate::error::{AppError, Result};
use crate::parser::parse_date;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when `other` lies entirely inside this range.
    pub fn covers(&self, other: &DateRange) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Accepts `2011-01-01 2011-12-31`, `2011-01-01..2011-12-31` or `2011-01-01,2011-12-31`.
impl FromStr for DateRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (start, end) = s
            .split_once("..")
            .or_else(|| s.split_once(','))
            .or_else(|| s.split_once(char::is_whitespace))
            .ok_or_else(|| {
                AppError::Parse(format!(
                    "Expected a date range like '2011-01-01 2011-12-31', got '{}'",
                    s
                ))
            })?;

        DateRange::new(parse_date(start.trim())?, parse_date(end.trim())?)
    }
}

/// Rows of `table` whose date lies in `range`, both ends inclusive, in source order.
pub fn filter_by_date(table: &RideTable, range: &DateRange) -> RideTable {
    table
        .records()
        .iter()
        .filter(|r| range.contains(r.date))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::RideRecord;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table(dates: &[&str]) -> RideTable {
        dates
            .iter()
            .map(|d| RideRecord {
                date: date(d),
                season: 1,
                temperature: 10.0,
                casual: 1,
                registered: 1,
                count: 2,
            })
            .collect()
    }

    #[test]
    fn test_range_rejects_inverted() {
        let result = DateRange::new(date("2011-02-01"), date("2011-01-01"));
        assert!(matches!(result, Err(AppError::InvalidRange { .. })));
    }

    #[test]
    fn test_single_day_range() {
        let day = date("2011-01-01");
        let range = DateRange::new(day, day).unwrap();
        assert!(range.contains(day));
        assert!(!range.contains(date("2011-01-02")));
    }

    #[test]
    fn test_filter_bounds_inclusive() {
        let t = table(&["2011-01-01", "2011-01-02", "2011-01-03", "2011-01-04"]);
        let range = DateRange::new(date("2011-01-02"), date("2011-01-03")).unwrap();

        let filtered = filter_by_date(&t, &range);
        let dates: Vec<String> = filtered.records().iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2011-01-02", "2011-01-03"]);
    }

    #[test]
    fn test_filter_keeps_source_order() {
        let t = table(&["2011-01-03", "2011-01-01", "2011-01-02"]);
        let range = DateRange::new(date("2011-01-01"), date("2011-01-03")).unwrap();
        assert_eq!(filter_by_date(&t, &range), t);
    }

    #[test]
    fn test_filter_outside_span_is_empty() {
        let t = table(&["2011-01-01", "2011-01-02"]);
        let range = DateRange::new(date("2013-01-01"), date("2013-12-31")).unwrap();
        assert!(filter_by_date(&t, &range).is_empty());
    }

    #[test]
    fn test_parse_range_forms() {
        let expected = DateRange::new(date("2011-01-01"), date("2011-12-31")).unwrap();
        assert_eq!("2011-01-01 2011-12-31".parse::<DateRange>().unwrap(), expected);
        assert_eq!("2011-01-01..2011-12-31".parse::<DateRange>().unwrap(), expected);
        assert_eq!(" 2011-01-01 , 2011-12-31 ".parse::<DateRange>().unwrap(), expected);
    }

    #[test]
    fn test_parse_range_errors() {
        assert!(matches!("2011-01-01".parse::<DateRange>(), Err(AppError::Parse(_))));
        assert!(matches!(
            "2011-12-31 2011-01-01".parse::<DateRange>(),
            Err(AppError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_display() {
        let range = DateRange::new(date("2011-01-01"), date("2011-01-31")).unwrap();
        assert_eq!(range.to_string(), "2011-01-01..2011-01-31");
    }
}
