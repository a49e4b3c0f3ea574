//! Derived views over a filtered ride table.
//!
//! Each builder is a pure function of its input table: no state is kept
//! between calls, so building twice from the same table gives equal output.

pub mod daily;
pub mod seasonal;
pub mod temperature;
pub mod trend;

pub use daily::{build_daily_totals, DailyTotal};
pub use seasonal::{build_seasonal_users, SeasonalUsers, UserType};
pub use temperature::{build_temperature_buckets, TemperatureBand, TemperatureBucket};
pub use trend::{build_weekday_trend, DayType, TrendPoint};

use crate::config::SeasonLabels;
use crate::data::models::RideTable;
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub weekday_trend: Vec<TrendPoint>,
    pub seasonal_users: Vec<SeasonalUsers>,
    pub daily_totals: Vec<DailyTotal>,
    pub temperature_buckets: [TemperatureBucket; 4],
}

impl DerivedViews {
    /// Trend, seasonal and daily views read `rides`; the temperature buckets read
    /// `temperature`, which may be the same table.
    pub fn build(rides: &RideTable, temperature: &RideTable, labels: &SeasonLabels) -> Result<Self> {
        Ok(Self {
            weekday_trend: build_weekday_trend(rides),
            seasonal_users: build_seasonal_users(rides, labels)?,
            daily_totals: build_daily_totals(rides),
            temperature_buckets: build_temperature_buckets(temperature),
        })
    }
}
