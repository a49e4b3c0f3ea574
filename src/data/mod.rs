pub mod models;

pub use models::{HeadlineMetrics, RideRecord, RideTable};
