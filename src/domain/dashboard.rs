// Dashboard snapshot domain model
use super::error::Notice;
use super::reading::{DeviceInfo, Span};
use super::statistics::{Statistics, Status};
use super::window::DataWindow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Where the readings in a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Remote,
    Simulated,
}

/// Immutable view of everything the dashboard shows at one point in time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub span: Span,
    pub source: DataSource,
    pub readings: Arc<DataWindow>,
    pub device_info: DeviceInfo,
    pub statistics: Statistics,
    pub status: Status,
    pub notice: Option<Notice>,
    /// Bumped on every published change.
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn new(
        span: Span,
        source: DataSource,
        readings: Arc<DataWindow>,
        device_info: DeviceInfo,
        notice: Option<Notice>,
        generation: u64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let statistics = Statistics::from_window(&readings);
        Self {
            span,
            source,
            readings,
            device_info,
            statistics,
            status: statistics.status(),
            notice,
            generation,
            updated_at,
        }
    }

    pub fn empty(span: Span) -> Self {
        Self::new(
            span,
            DataSource::Simulated,
            Arc::new(DataWindow::new()),
            DeviceInfo::default(),
            None,
            0,
            Utc::now(),
        )
    }
}
