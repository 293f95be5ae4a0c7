// Dashboard controller - Owns configuration, span and the refresh timer
use crate::application::acquisition::AcquisitionEngine;
use crate::application::config_store::ConfigStore;
use crate::application::reading_source::ReadingSource;
use crate::application::scheduler::{RefreshMode, RefreshScheduler, TimerKey};
use crate::application::simulator::Simulator;
use crate::domain::connection::ConnectionConfig;
use crate::domain::dashboard::{DashboardSnapshot, DataSource};
use crate::domain::error::{AcquisitionError, Notice};
use crate::domain::reading::Span;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug)]
pub enum ControllerCommand {
    SaveConfig {
        config: ConnectionConfig,
        reply: oneshot::Sender<Result<ConnectionConfig, String>>,
    },
    SelectSpan(Span),
    Retry,
}

/// Cloneable front door to a running [`DashboardController`].
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<ControllerCommand>,
    snapshots: watch::Receiver<Arc<DashboardSnapshot>>,
    config: watch::Receiver<ConnectionConfig>,
}

impl ControllerHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.snapshots.clone()
    }

    pub fn config(&self) -> ConnectionConfig {
        self.config.borrow().clone()
    }

    /// Persist and apply a new configuration. Returns the configuration as saved.
    pub async fn save_config(&self, config: ConnectionConfig) -> anyhow::Result<ConnectionConfig> {
        let (reply, response) = oneshot::channel();
        self.send(ControllerCommand::SaveConfig { config, reply }).await?;
        response
            .await
            .context("Controller dropped the save request")?
            .map_err(anyhow::Error::msg)
    }

    pub async fn select_span(&self, span: Span) -> anyhow::Result<()> {
        self.send(ControllerCommand::SelectSpan(span)).await
    }

    /// Re-run the initial load, e.g. after a fetch error.
    pub async fn retry(&self) -> anyhow::Result<()> {
        self.send(ControllerCommand::Retry).await
    }

    async fn send(&self, command: ControllerCommand) -> anyhow::Result<()> {
        self.commands
            .send(command)
            .await
            .context("Dashboard controller is not running")
    }
}

/// Single owner of all acquisition state.
///
/// Commands and timer ticks are handled one at a time on one task, so two
/// fetches never overlap and every snapshot reflects a completed operation.
pub struct DashboardController {
    engine: AcquisitionEngine,
    simulator: Simulator,
    store: Arc<dyn ConfigStore>,
    config: ConnectionConfig,
    span: Span,
    source: DataSource,
    notice: Option<Notice>,
    generation: u64,
    snapshots: watch::Sender<Arc<DashboardSnapshot>>,
    config_tx: watch::Sender<ConnectionConfig>,
}

impl DashboardController {
    /// Start the controller on the current runtime.
    pub fn spawn(
        source: Arc<dyn ReadingSource>,
        store: Arc<dyn ConfigStore>,
        config: ConnectionConfig,
        span: Span,
    ) -> ControllerHandle {
        Self::spawn_with(source, store, config, span, Simulator::new())
    }

    pub fn spawn_with(
        source: Arc<dyn ReadingSource>,
        store: Arc<dyn ConfigStore>,
        config: ConnectionConfig,
        span: Span,
        simulator: Simulator,
    ) -> ControllerHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshots, snapshots_rx) = watch::channel(Arc::new(DashboardSnapshot::empty(span)));
        let (config_tx, config_rx) = watch::channel(config.clone());

        let controller = Self {
            engine: AcquisitionEngine::new(source),
            simulator,
            store,
            config,
            span,
            source: DataSource::Simulated,
            notice: None,
            generation: 0,
            snapshots,
            config_tx,
        };
        tokio::spawn(controller.run(commands_rx));

        ControllerHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
            config: config_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<ControllerCommand>) {
        tracing::info!(
            "Dashboard controller started (span {}, {})",
            self.span.label(),
            if self.config.is_fully_specified() {
                "remote source"
            } else {
                "simulated data"
            }
        );

        self.reload().await;
        let mut scheduler = RefreshScheduler::new(TimerKey::for_config(&self.config));

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle(command).await;
                    if scheduler.reconfigure(TimerKey::for_config(&self.config)) {
                        tracing::info!(
                            "Refresh timer restarted ({:?}, every {}s)",
                            scheduler.mode(),
                            scheduler.key().period.as_secs()
                        );
                    }
                }
                _ = scheduler.tick() => self.on_tick(scheduler.mode()).await,
            }
        }

        tracing::info!("Dashboard controller stopped");
    }

    async fn handle(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::SaveConfig { config, reply } => {
                let result = self.save_config(config).await;
                let _ = reply.send(result);
            }
            ControllerCommand::SelectSpan(span) => {
                if span != self.span {
                    tracing::info!("Span changed {} -> {}", self.span.label(), span.label());
                    self.span = span;
                    self.reload().await;
                }
            }
            ControllerCommand::Retry => {
                tracing::info!("Manual retry requested");
                self.reload().await;
            }
        }
    }

    async fn save_config(&mut self, config: ConnectionConfig) -> Result<ConnectionConfig, String> {
        let config = config.normalized();
        if let Err(e) = self.store.save(&config).await {
            tracing::error!("Failed to persist configuration: {:#}", e);
            return Err(format!("failed to save configuration: {:#}", e));
        }

        if config != self.config {
            self.config = config.clone();
            self.config_tx.send_replace(config.clone());
            self.reload().await;
        }
        Ok(config)
    }

    /// Initial load for the current configuration and span.
    ///
    /// Without a usable configuration the window is filled with a synthetic
    /// series instead.
    async fn reload(&mut self) {
        match self.engine.initial_load(&self.config, self.span).await {
            Ok(count) => {
                tracing::info!("Loaded {} readings for span {}", count, self.span.label());
                self.source = DataSource::Remote;
                self.notice = None;
            }
            Err(AcquisitionError::Configuration { field }) => {
                tracing::debug!("Connection not configured ({} missing), simulating data", field);
                let error = AcquisitionError::Configuration { field };
                let series = self.simulator.series(self.span, Utc::now());
                self.engine.install_window(series);
                self.source = DataSource::Simulated;
                self.notice = Some(Notice::from(&error));
            }
            Err(AcquisitionError::EmptyResult) => {
                tracing::info!("No readings in the last {}", self.span.label());
                self.source = DataSource::Remote;
                self.notice = Some(Notice::from(&AcquisitionError::EmptyResult));
            }
            Err(error) => {
                tracing::warn!("Initial load failed: {}", error);
                // Synthetic readings must never seed a remote incremental query.
                if self.source == DataSource::Simulated {
                    self.engine.clear();
                    self.source = DataSource::Remote;
                }
                self.notice = Some(Notice::from(&error));
            }
        }
        self.publish();
    }

    async fn on_tick(&mut self, mode: RefreshMode) {
        match mode {
            RefreshMode::Remote => {
                match self.engine.incremental_refresh(&self.config, self.span).await {
                    Ok(_) => {
                        self.source = DataSource::Remote;
                        self.notice = None;
                    }
                    Err(AcquisitionError::EmptyResult) => {
                        self.source = DataSource::Remote;
                        self.notice = Some(Notice::from(&AcquisitionError::EmptyResult));
                    }
                    Err(error) => {
                        tracing::warn!("Refresh failed: {}", error);
                        self.notice = Some(Notice::from(&error));
                    }
                }
            }
            RefreshMode::Simulated => {
                self.simulator
                    .step(self.engine.window_mut(), self.span, Utc::now());
            }
        }
        self.publish();
    }

    fn publish(&mut self) {
        self.generation += 1;
        let snapshot = DashboardSnapshot::new(
            self.span,
            self.source,
            Arc::new(self.engine.window().clone()),
            self.engine.device_info().clone(),
            self.notice.clone(),
            self.generation,
            Utc::now(),
        );
        tracing::debug!(
            "Published snapshot {} ({} readings, {})",
            self.generation,
            snapshot.readings.len(),
            snapshot.status.label()
        );
        self.snapshots.send_replace(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::{MemoryConfigStore, ScriptedSource, configured, rows_between};
    use crate::application::reading_source::Bound;
    use crate::domain::error::NoticeKind;
    use std::time::Duration;

    fn start(
        source: &Arc<ScriptedSource>,
        store: &Arc<MemoryConfigStore>,
        config: ConnectionConfig,
    ) -> ControllerHandle {
        DashboardController::spawn_with(
            source.clone(),
            store.clone(),
            config,
            Span::OneHour,
            Simulator::with_seed(9),
        )
    }

    async fn wait_for(
        handle: &ControllerHandle,
        predicate: impl FnMut(&Arc<DashboardSnapshot>) -> bool,
    ) -> Arc<DashboardSnapshot> {
        let mut rx = handle.subscribe();
        let snapshot = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(predicate))
            .await
            .expect("timed out waiting for snapshot")
            .expect("controller stopped");
        snapshot.clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_start_simulates() {
        let source = Arc::new(ScriptedSource::new());
        let store = Arc::new(MemoryConfigStore::new());
        let handle = start(&source, &store, ConnectionConfig::default());

        let snapshot = wait_for(&handle, |s| s.generation >= 1).await;

        assert_eq!(snapshot.source, DataSource::Simulated);
        assert_eq!(snapshot.readings.len(), 60);
        assert_eq!(snapshot.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Configuration));
        assert!(source.queries().is_empty());

        // The simulator keeps the series moving on the refresh cadence.
        let first_last = snapshot.readings.last_timestamp();
        let later = wait_for(&handle, |s| s.generation >= 2).await;
        assert!(later.readings.last_timestamp() >= first_last);
        assert!(source.queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_config_persists_and_loads() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(rows_between(Utc::now() - chrono::Duration::minutes(10), 0, 25));
        let store = Arc::new(MemoryConfigStore::new());
        let handle = start(&source, &store, ConnectionConfig::default());
        wait_for(&handle, |s| s.generation >= 1).await;

        let saved = handle.save_config(configured()).await.unwrap();

        assert_eq!(saved, configured());
        assert_eq!(store.saved(), Some(configured()));
        assert_eq!(handle.config(), configured());
        let snapshot = wait_for(&handle, |s| s.source == DataSource::Remote).await;
        assert_eq!(snapshot.readings.len(), 25);
        assert!(snapshot.notice.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_leaves_config_unchanged() {
        let source = Arc::new(ScriptedSource::new());
        let store = Arc::new(MemoryConfigStore::new());
        store.fail_saves(true);
        let handle = start(&source, &store, ConnectionConfig::default());

        let result = handle.save_config(configured()).await;

        assert!(result.is_err());
        assert_eq!(handle.config(), ConnectionConfig::default());
        assert!(source.queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_is_surfaced_and_retry_recovers() {
        let source = Arc::new(ScriptedSource::new());
        source.push_err(AcquisitionError::fetch(Some(401), "bad key"));
        source.push_ok(rows_between(Utc::now() - chrono::Duration::minutes(5), 0, 3));
        let store = Arc::new(MemoryConfigStore::with(configured()));
        let handle = start(&source, &store, configured());

        let failed = wait_for(&handle, |s| s.generation >= 1).await;
        let notice = failed.notice.clone().unwrap();
        assert_eq!(notice.kind, NoticeKind::Fetch);
        assert!(notice.retryable);

        handle.retry().await.unwrap();
        let recovered = wait_for(&handle, |s| s.readings.len() == 3).await;
        assert!(recovered.notice.is_none());
        assert_eq!(recovered.source, DataSource::Remote);
    }

    #[tokio::test(start_paused = true)]
    async fn test_span_change_triggers_initial_load() {
        let source = Arc::new(ScriptedSource::new());
        let store = Arc::new(MemoryConfigStore::with(configured()));
        let handle = start(&source, &store, configured());
        let empty = wait_for(&handle, |s| s.generation >= 1).await;
        assert_eq!(empty.notice.as_ref().map(|n| n.kind), Some(NoticeKind::NoData));

        source.push_ok(rows_between(Utc::now() - chrono::Duration::hours(5), 0, 10));
        handle.select_span(Span::SixHours).await.unwrap();

        let loaded = wait_for(&handle, |s| s.span == Span::SixHours && s.readings.len() == 10).await;
        assert!(loaded.notice.is_none());
        let queries = source.queries();
        assert!(queries[1].page.is_some());
        assert!(queries[1].since < queries[0].since - chrono::Duration::hours(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_after_simulation_discards_synthetic_readings() {
        let source = Arc::new(ScriptedSource::new());
        let store = Arc::new(MemoryConfigStore::new());
        let handle = start(&source, &store, ConnectionConfig::default());
        let simulated = wait_for(&handle, |s| s.generation >= 1).await;
        assert_eq!(simulated.readings.len(), 60);

        source.push_err(AcquisitionError::fetch(Some(503), "unavailable"));
        source.push_ok(rows_between(Utc::now() - chrono::Duration::seconds(30), 0, 2));
        handle.save_config(configured()).await.unwrap();

        let failed = handle.snapshot();
        assert!(failed.readings.is_empty());
        assert_eq!(failed.source, DataSource::Remote);
        assert_eq!(failed.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Fetch));

        // The next tick starts from an empty window, so it backfills the span.
        let loaded = wait_for(&handle, |s| s.readings.len() == 2).await;
        assert!(loaded.notice.is_none());
        assert_eq!(loaded.source, DataSource::Remote);
        assert_eq!(loaded.readings.values().collect::<Vec<_>>(), vec![0, 1]);

        let queries = source.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.bound == Bound::Inclusive && q.page.is_some()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_tick_refreshes_incrementally() {
        let base = Utc::now() - chrono::Duration::seconds(60);
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(rows_between(base, 0, 3));
        source.push_err(AcquisitionError::fetch(Some(500), "boom"));
        source.push_ok(rows_between(base, 3, 2));
        let store = Arc::new(MemoryConfigStore::with(configured()));
        let handle = start(&source, &store, configured());

        let loaded = wait_for(&handle, |s| s.generation >= 1).await;
        assert_eq!(loaded.readings.len(), 3);
        assert!(loaded.notice.is_none());

        // A failed tick keeps the window and reports the error.
        let failed = wait_for(&handle, |s| s.notice.is_some()).await;
        assert_eq!(failed.readings.len(), 3);
        assert_eq!(failed.source, DataSource::Remote);
        assert_eq!(failed.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Fetch));

        let refreshed = wait_for(&handle, |s| s.readings.len() == 5).await;
        assert!(refreshed.notice.is_none());
        assert_eq!(refreshed.readings.values().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

        let queries = source.queries();
        let last_loaded = base + chrono::Duration::seconds(2);
        assert!(queries[0].page.is_some());
        for query in &queries[1..3] {
            assert_eq!(query.bound, Bound::Exclusive);
            assert!(query.page.is_none());
            assert_eq!(query.since, last_loaded);
        }
    }
}
