// Acquisition engine - Backfill and incremental polling against a reading source
use crate::application::reading_source::{PAGE_SIZE, ReadingQuery, ReadingSource};
use crate::domain::connection::ConnectionConfig;
use crate::domain::error::AcquisitionError;
use crate::domain::reading::{DeviceInfo, Span, SourceRow};
use crate::domain::window::DataWindow;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Keeps the data window and device info in step with a remote source.
///
/// Every operation either applies its whole result or leaves the current
/// state untouched; callers never observe a half-merged window.
pub struct AcquisitionEngine {
    source: Arc<dyn ReadingSource>,
    window: DataWindow,
    device_info: DeviceInfo,
}

impl AcquisitionEngine {
    pub fn new(source: Arc<dyn ReadingSource>) -> Self {
        Self {
            source,
            window: DataWindow::new(),
            device_info: DeviceInfo::default(),
        }
    }

    pub fn window(&self) -> &DataWindow {
        &self.window
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Replace the window with locally produced readings (simulator mode).
    pub fn install_window(&mut self, window: DataWindow) {
        self.window = window;
    }

    /// Mutable access for the simulator, which advances the window in place.
    pub fn window_mut(&mut self) -> &mut DataWindow {
        &mut self.window
    }

    /// Forget all readings and device metadata.
    pub fn clear(&mut self) {
        self.window = DataWindow::new();
        self.device_info = DeviceInfo::default();
    }

    pub async fn initial_load(
        &mut self,
        config: &ConnectionConfig,
        span: Span,
    ) -> Result<usize, AcquisitionError> {
        self.initial_load_at(config, span, Utc::now()).await
    }

    /// Page through everything since `now - span` and replace the window.
    ///
    /// Returns the number of readings now in the window.
    pub async fn initial_load_at(
        &mut self,
        config: &ConnectionConfig,
        span: Span,
        now: DateTime<Utc>,
    ) -> Result<usize, AcquisitionError> {
        config.validate()?;

        let since = span.start(now);
        let mut rows: Vec<SourceRow> = Vec::new();
        let mut offset = 0;
        let mut pages = 0;

        loop {
            let page = self
                .source
                .fetch(config, &ReadingQuery::backfill(since, offset))
                .await?;
            pages += 1;

            let count = page.len();
            rows.extend(page);
            if count < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }

        tracing::debug!(
            "Initial load for sensor {} fetched {} rows in {} pages (span {})",
            config.sensor_id,
            rows.len(),
            pages,
            span.label()
        );

        if let Some(info) = latest_device_info(&rows) {
            self.device_info = info;
        }
        self.window = DataWindow::from_readings(rows.into_iter().map(|r| r.reading).collect());

        if self.window.is_empty() {
            return Err(AcquisitionError::EmptyResult);
        }
        Ok(self.window.len())
    }

    pub async fn incremental_refresh(
        &mut self,
        config: &ConnectionConfig,
        span: Span,
    ) -> Result<usize, AcquisitionError> {
        self.incremental_refresh_at(config, span, Utc::now()).await
    }

    /// Fetch only rows newer than the last known reading, append, then trim.
    ///
    /// Falls back to a full initial load when there is no prior reading.
    /// Returns the number of readings appended.
    pub async fn incremental_refresh_at(
        &mut self,
        config: &ConnectionConfig,
        span: Span,
        now: DateTime<Utc>,
    ) -> Result<usize, AcquisitionError> {
        let Some(last_known) = self.window.last_timestamp() else {
            return self.initial_load_at(config, span, now).await;
        };
        config.validate()?;

        let rows = self
            .source
            .fetch(config, &ReadingQuery::newer_than(last_known))
            .await?;

        if let Some(info) = latest_device_info(&rows) {
            self.device_info = info;
        }

        let fetched = rows.len();
        let appended = self
            .window
            .merge_and_trim(rows.into_iter().map(|r| r.reading), span, now);

        tracing::debug!(
            "Incremental refresh for sensor {}: {} new rows, {} appended, window now {}",
            config.sensor_id,
            fetched,
            appended,
            self.window.len()
        );

        Ok(appended)
    }
}

/// Metadata of the chronologically last row that carries any.
fn latest_device_info(rows: &[SourceRow]) -> Option<DeviceInfo> {
    rows.iter()
        .filter_map(|row| row.metadata.as_ref().map(|m| (row.reading.timestamp, m)))
        .max_by_key(|(timestamp, _)| *timestamp)
        .map(|(_, metadata)| metadata.clone())
}
