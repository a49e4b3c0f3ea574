use crate::config::{ColorConfig, Config, SeasonLabels};
use crate::data::models::{HeadlineMetrics, RideTable};
use crate::error::{AppError, Result};
use crate::fetcher::Fetcher;
use crate::filter::{filter_by_date, DateRange};
use crate::parser::Parser;
use crate::views::DerivedViews;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "range", rename_all = "lowercase")]
pub enum SessionState {
    /// No range confirmed yet; views cover the full date span.
    Idle,
    Filtered(DateRange),
}

/// An event from the presentation layer, one per input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// "Apply Filters" with the selected range.
    Confirm(DateRange),
    Reset,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "reset" => Ok(SessionCommand::Reset),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Ok(SessionCommand::Confirm(other.parse()?)),
        }
    }
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub metrics: HeadlineMetrics,
    pub state: SessionState,
    /// Range the views were computed over, `None` when the dataset is empty.
    pub applied_range: Option<DateRange>,
    pub date_bounds: Option<DateRange>,
    pub views: DerivedViews,
    pub colors: ColorConfig,
}

impl DashboardSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Owns the loaded tables for one dashboard session and recomputes the views
/// whenever a new date range is confirmed.
pub struct DashboardSession {
    rides: Arc<RideTable>,
    temperature: Arc<RideTable>,
    labels: SeasonLabels,
    colors: ColorConfig,
    metrics: HeadlineMetrics,
    state: SessionState,
}

impl DashboardSession {
    /// `temperature` defaults to the ride table when `None`.
    pub fn new(
        rides: RideTable,
        temperature: Option<RideTable>,
        labels: SeasonLabels,
        colors: ColorConfig,
    ) -> Self {
        let rides = Arc::new(rides);
        let temperature = match temperature {
            Some(table) => Arc::new(table),
            None => Arc::clone(&rides),
        };
        let metrics = rides.headline_metrics();

        Self {
            rides,
            temperature,
            labels,
            colors,
            metrics,
            state: SessionState::Idle,
        }
    }

    /// Load every configured dataset and start a session. Any load failure is fatal.
    pub async fn load(config: &Config) -> Result<Self> {
        let fetcher = Fetcher::new(Duration::from_secs(config.http.timeout_seconds))?;

        let rides_source = config.datasets.rides_source()?;
        let content = fetcher.fetch(&rides_source).await?;
        let (rides, summary) = Parser::parse_table_with_columns(&content, &config.columns)?;
        info!(
            "Loaded {} ride rows from {} (span {:?})",
            summary.rows, rides_source, summary.date_span
        );

        let temperature = match config.datasets.temperature_source()? {
            Some(source) => {
                let content = fetcher.fetch(&source).await?;
                let (table, summary) = Parser::parse_table_with_columns(&content, &config.columns)?;
                info!(
                    "Loaded {} temperature rows from {} (span {:?})",
                    summary.rows, source, summary.date_span
                );
                Some(table)
            }
            None => None,
        };

        let mut session = Self::new(
            rides,
            temperature,
            config.seasons.clone(),
            config.colors.clone(),
        );

        if let Some(filter) = &config.filter {
            session.state = SessionState::Filtered(DateRange::new(filter.start, filter.end)?);
        }

        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn metrics(&self) -> HeadlineMetrics {
        self.metrics
    }

    /// Earliest and latest ride date, the limits offered by the date picker.
    pub fn date_bounds(&self) -> Option<DateRange> {
        self.rides
            .date_bounds()
            .and_then(|(min, max)| DateRange::new(min, max).ok())
    }

    /// Apply a confirmed date range and recompute every view.
    pub fn confirm(&mut self, range: DateRange) -> Result<DashboardSnapshot> {
        if let Some(bounds) = self.date_bounds() {
            if !bounds.covers(&range) {
                warn!("Range {} extends beyond the dataset span {}", range, bounds);
            }
        }

        // Compute before transitioning so a failed build leaves the state untouched.
        let snapshot = self.compute(SessionState::Filtered(range))?;
        info!("Session state: {:?} -> Filtered({})", self.state, range);
        self.state = SessionState::Filtered(range);
        Ok(snapshot)
    }

    /// Drop any confirmed range and go back to the full span.
    pub fn reset(&mut self) -> Result<DashboardSnapshot> {
        let snapshot = self.compute(SessionState::Idle)?;
        info!("Session state: {:?} -> Idle", self.state);
        self.state = SessionState::Idle;
        Ok(snapshot)
    }

    /// Views for the current state, without a transition.
    pub fn snapshot(&self) -> Result<DashboardSnapshot> {
        self.compute(self.state)
    }

    fn compute(&self, state: SessionState) -> Result<DashboardSnapshot> {
        let applied_range = match state {
            SessionState::Idle => self.date_bounds(),
            SessionState::Filtered(range) => Some(range),
        };

        let (rides, temperature) = match &applied_range {
            Some(range) => (
                filter_by_date(&self.rides, range),
                filter_by_date(&self.temperature, range),
            ),
            None => (RideTable::default(), RideTable::default()),
        };

        let views = DerivedViews::build(&rides, &temperature, &self.labels)?;
        debug!(
            "Recomputed views over {} ride rows and {} temperature rows: {} trend points, {} seasonal rows, {} days",
            rides.len(),
            temperature.len(),
            views.weekday_trend.len(),
            views.seasonal_users.len(),
            views.daily_totals.len()
        );

        Ok(DashboardSnapshot {
            metrics: self.metrics,
            state,
            applied_range,
            date_bounds: self.date_bounds(),
            views,
            colors: self.colors.clone(),
        })
    }
}
