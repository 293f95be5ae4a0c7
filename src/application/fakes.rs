// Test doubles for the application layer
use crate::application::config_store::ConfigStore;
use crate::application::reading_source::{ReadingQuery, ReadingSource};
use crate::domain::connection::ConnectionConfig;
use crate::domain::error::AcquisitionError;
use crate::domain::reading::{Reading, SourceRow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Replays queued responses in order and records every query it receives.
/// Once the queue is drained every fetch returns no rows.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<SourceRow>, AcquisitionError>>>,
    queries: Mutex<Vec<ReadingQuery>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, rows: Vec<SourceRow>) {
        self.responses.lock().unwrap().push_back(Ok(rows));
    }

    pub fn push_err(&self, error: AcquisitionError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn queries(&self) -> Vec<ReadingQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReadingSource for ScriptedSource {
    async fn fetch(
        &self,
        _config: &ConnectionConfig,
        query: &ReadingQuery,
    ) -> Result<Vec<SourceRow>, AcquisitionError> {
        self.queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn configured() -> ConnectionConfig {
    ConnectionConfig {
        endpoint_url: "https://example.supabase.co/rest/v1".to_string(),
        api_key: "anon-key".to_string(),
        sensor_id: "mq2-kitchen".to_string(),
        table_name: "sensor_readings".to_string(),
        refresh_interval_seconds: 5,
    }
}

/// `count` rows one second apart, starting `first` seconds after `start`.
pub fn rows_between(start: DateTime<Utc>, first: usize, count: usize) -> Vec<SourceRow> {
    (first..first + count)
        .map(|i| {
            let reading = Reading::new(start + Duration::seconds(i as i64), (i % 4096) as u16);
            SourceRow::new(reading, None)
        })
        .collect()
}

/// In-memory configuration store that can be told to fail.
#[derive(Default)]
pub struct MemoryConfigStore {
    saved: Mutex<Option<ConnectionConfig>>,
    fail_saves: AtomicBool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(config: ConnectionConfig) -> Self {
        Self {
            saved: Mutex::new(Some(config)),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn saved(&self) -> Option<ConnectionConfig> {
        self.saved.lock().unwrap().clone()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> anyhow::Result<Option<ConnectionConfig>> {
        Ok(self.saved())
    }

    async fn save(&self, config: &ConnectionConfig) -> anyhow::Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            anyhow::bail!("storage is read-only");
        }
        *self.saved.lock().unwrap() = Some(config.clone());
        Ok(())
    }
}
