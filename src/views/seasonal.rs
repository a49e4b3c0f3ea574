//! Casual vs registered riders per season, in long format.

use crate::config::SeasonLabels;
use crate::data::models::RideTable;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Casual,
    Registered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonalUsers {
    pub season_code: u8,
    pub season: String,
    pub user_type: UserType,
    pub total_count: u64,
}

/// Two rows per season present (casual, then registered), ordered by season code.
pub fn build_seasonal_users(table: &RideTable, labels: &SeasonLabels) -> Result<Vec<SeasonalUsers>> {
    let mut sums: BTreeMap<u8, (u64, u64)> = BTreeMap::new();
    for record in table.records() {
        let entry = sums.entry(record.season).or_insert((0, 0));
        entry.0 += record.casual;
        entry.1 += record.registered;
    }

    let mut rows = Vec::with_capacity(sums.len() * 2);
    for (code, (casual, registered)) in sums {
        let season = labels.label_for(code)?;
        for (user_type, total_count) in [(UserType::Casual, casual), (UserType::Registered, registered)] {
            rows.push(SeasonalUsers {
                season_code: code,
                season: season.clone(),
                user_type,
                total_count,
            });
        }
    }

    Ok(rows)
}
