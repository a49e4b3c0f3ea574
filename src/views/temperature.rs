//! Ride totals bucketed by temperature.

use crate::data::models::RideTable;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureBand {
    Cold,
    Cool,
    Warm,
    Hot,
}

impl TemperatureBand {
    pub const ALL: [TemperatureBand; 4] = [
        TemperatureBand::Cold,
        TemperatureBand::Cool,
        TemperatureBand::Warm,
        TemperatureBand::Hot,
    ];

    /// Lower bounds are inclusive: exactly 10, 20 and 30 go to the warmer band.
    pub fn of(temperature: f64) -> Self {
        if temperature < 10.0 {
            TemperatureBand::Cold
        } else if temperature < 20.0 {
            TemperatureBand::Cool
        } else if temperature < 30.0 {
            TemperatureBand::Warm
        } else {
            TemperatureBand::Hot
        }
    }

    fn index(self) -> usize {
        match self {
            TemperatureBand::Cold => 0,
            TemperatureBand::Cool => 1,
            TemperatureBand::Warm => 2,
            TemperatureBand::Hot => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemperatureBucket {
    pub condition: TemperatureBand,
    pub total_count: u64,
}

/// Always four buckets in Cold, Cool, Warm, Hot order, zero-filled.
pub fn build_temperature_buckets(table: &RideTable) -> [TemperatureBucket; 4] {
    let mut totals = [0u64; 4];
    for record in table.records() {
        totals[TemperatureBand::of(record.temperature).index()] += record.count;
    }

    TemperatureBand::ALL.map(|condition| TemperatureBucket {
        condition,
        total_count: totals[condition.index()],
    })
}
